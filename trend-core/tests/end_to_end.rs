use trend_core::{
    run_analysis, AbnormalStatus, AbnormalVisit, AnalysisConfig, PatientInfo, ReferenceRange,
    TrendDirection, TrendError, VisitInput,
};

fn patient() -> PatientInfo {
    PatientInfo::new("Nguyen Van A", "BN-001", "58", "male", "Metabolic follow-up")
}

// 60 is below and 130 above [70, 100], so both visits are flagged.
#[test]
fn glucose_rising_from_low_to_high() {
    let visits = [
        VisitInput::new("2024-02-01").with_value("glucose", "130"),
        VisitInput::new("2024-01-01").with_value("glucose", "60"),
    ];

    let outcome = run_analysis(patient(), &visits, &AnalysisConfig::default())
        .expect("analysis should succeed");

    let glucose = outcome
        .analysis
        .parameter("glucose")
        .expect("glucose analysed");
    assert_eq!(glucose.trend.trend, TrendDirection::Increasing);
    assert_eq!(glucose.trend.change, 70.0);
    assert_eq!(
        glucose.abnormalities,
        vec![
            AbnormalVisit {
                date: "2024-01-01".into(),
                value: 60.0,
                status: AbnormalStatus::Low,
            },
            AbnormalVisit {
                date: "2024-02-01".into(),
                value: 130.0,
                status: AbnormalStatus::High,
            },
        ]
    );
    assert_eq!(glucose.abnormal_count, 2);
    assert_eq!(outcome.abnormal_parameters, vec!["glucose"]);
    assert!(outcome.guidance.contains_key("glucose"));
    assert_eq!(outcome.guidance.len(), 1);
}

#[test]
fn glucose_low_then_normal() {
    let visits = [
        VisitInput::new("2024-01-01").with_value("glucose", "60"),
        VisitInput::new("2024-02-01").with_value("glucose", "95"),
    ];

    let outcome = run_analysis(patient(), &visits, &AnalysisConfig::default()).unwrap();
    let glucose = outcome.analysis.parameter("glucose").unwrap();

    assert_eq!(glucose.trend.trend, TrendDirection::Increasing);
    assert_eq!(glucose.trend.change, 35.0);
    assert_eq!(glucose.abnormal_count, 1);
    assert_eq!(glucose.abnormalities[0].date, "2024-01-01");
    assert_eq!(glucose.abnormalities[0].status, AbnormalStatus::Low);
    assert_eq!(outcome.abnormal_parameters, vec!["glucose"]);
}

#[test]
fn report_json_uses_lowercase_labels() {
    let visits = [
        VisitInput::new("2024-01-01").with_value("blood_pressure", "150"),
        VisitInput::new("2024-03-01").with_value("blood_pressure", "118"),
    ];
    let outcome = run_analysis(patient(), &visits, &AnalysisConfig::default()).unwrap();
    let json = serde_json::to_value(&outcome).unwrap();

    let bp = &json["analysis"]["parameters"]["blood_pressure"];
    assert_eq!(bp["trend"]["trend"], "decreasing");
    assert_eq!(bp["abnormalities"][0]["status"], "high");
    assert_eq!(bp["normal_range"], serde_json::json!([90.0, 120.0]));
    assert!(bp["normal_range"][0].is_number());
    assert_eq!(json["analysis"]["date_range"]["start"], "2024-01-01");
    assert_eq!(json["analysis"]["patient_info"]["id"], "BN-001");
    assert_eq!(json["abnormal_parameters"][0], "blood_pressure");
}

#[test]
fn custom_parameter_gets_a_report_but_no_guidance() {
    let config = AnalysisConfig::default()
        .with_overrides([("hba1c", ReferenceRange::new(4.0, 5.6))])
        .unwrap();
    let visits = [
        VisitInput::new("2024-01-01").with_value("hba1c", "6.1"),
        VisitInput::new("2024-04-01").with_value("hba1c", "5.9"),
    ];

    let outcome = run_analysis(patient(), &visits, &config).unwrap();
    let hba1c = outcome.analysis.parameter("hba1c").unwrap();
    assert_eq!(hba1c.trend.change, -0.2);
    assert_eq!(hba1c.abnormal_count, 2);
    assert_eq!(outcome.abnormal_parameters, vec!["hba1c"]);
    assert!(outcome.guidance.is_empty());
}

#[test]
fn empty_request_differs_from_sparse_request() {
    let config = AnalysisConfig::default();
    assert_eq!(
        run_analysis(patient(), &[], &config).unwrap_err(),
        TrendError::NoReports
    );

    let visits = [
        VisitInput::new("2024-01-01").with_value("glucose", "120"),
        VisitInput::new("2024-02-01").with_value("cholesterol", "230"),
    ];
    assert_eq!(
        run_analysis(patient(), &visits, &config).unwrap_err(),
        TrendError::AnalysisUnavailable
    );
}

#[test]
fn one_trended_parameter_is_enough() {
    let visits = [
        VisitInput::new("2024-01-01")
            .with_value("glucose", "120")
            .with_value("cholesterol", "230"),
        VisitInput::new("2024-02-01").with_value("glucose", "118"),
    ];
    let outcome = run_analysis(patient(), &visits, &AnalysisConfig::default()).unwrap();
    assert_eq!(outcome.analysis.parameters.len(), 1);
    assert!(outcome.analysis.parameter("cholesterol").is_none());
    assert_eq!(outcome.abnormal_parameters, vec!["glucose"]);
}
