//! Field catalogue and page template for the risk form.

use crate::data::FEATURE_ORDER;
use serde::Serialize;
use std::collections::HashMap;

/// How a field is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// Free numeric input.
    Continuous { placeholder: &'static str },
    /// A `<select>` over fixed `(value, label)` pairs.
    Categorical {
        options: &'static [(&'static str, &'static str)],
    },
}

/// One input on the form. `key` is the feature column it feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FormField {
    pub key: &'static str,
    pub label: &'static str,
    pub unit: Option<&'static str>,
    pub description: &'static str,
    pub kind: FieldKind,
}

const fn continuous(
    key: &'static str,
    label: &'static str,
    unit: &'static str,
    placeholder: &'static str,
    description: &'static str,
) -> FormField {
    FormField {
        key,
        label,
        unit: Some(unit),
        description,
        kind: FieldKind::Continuous { placeholder },
    }
}

const fn categorical(
    key: &'static str,
    label: &'static str,
    options: &'static [(&'static str, &'static str)],
    description: &'static str,
) -> FormField {
    FormField {
        key,
        label,
        unit: None,
        description,
        kind: FieldKind::Categorical { options },
    }
}

/// The form fields, in model input order.
pub const FIELDS: [FormField; 13] = [
    continuous("age", "Age", "years", "e.g., 52", "Patient Age"),
    categorical("sex", "Sex", &[("1", "Male"), ("0", "Female")], "1=Male, 0=Female"),
    categorical(
        "cp",
        "Chest Pain Type",
        &[
            ("0", "Typical Angina"),
            ("1", "Atypical Angina"),
            ("2", "Non-anginal Pain"),
            ("3", "Asymptomatic"),
        ],
        "Type of chest pain",
    ),
    continuous(
        "trestbps",
        "Resting Blood Pressure",
        "mm Hg",
        "e.g., 125",
        "Systolic BP on admission",
    ),
    continuous("chol", "Serum Cholesterol", "mg/dl", "e.g., 216", "Total serum cholesterol"),
    categorical(
        "fbs",
        "Fasting Blood Sugar",
        &[("1", "True (> 120 mg/dl)"), ("0", "False (≤ 120 mg/dl)")],
        "Is FBS > 120 mg/dl?",
    ),
    categorical(
        "restecg",
        "Resting ECG Results",
        &[
            ("0", "Normal"),
            ("1", "ST-T Wave Abnormality"),
            ("2", "Left Ventricular Hypertrophy"),
        ],
        "ECG abnormality type",
    ),
    continuous("thalach", "Max Heart Rate Achieved", "bpm", "e.g., 140", "Maximum heart rate"),
    categorical(
        "exang",
        "Exercise Induced Angina",
        &[("1", "Yes"), ("0", "No")],
        "Chest pain during exercise?",
    ),
    continuous(
        "oldpeak",
        "ST Depression (Oldpeak)",
        "mm",
        "e.g., 1.5",
        "ST depression induced by exercise",
    ),
    categorical(
        "slope",
        "Slope of Peak Exercise ST Segment",
        &[("0", "Upsloping"), ("1", "Flat"), ("2", "Downsloping")],
        "Slope of the ST segment",
    ),
    categorical(
        "ca",
        "Number of Major Vessels",
        &[("0", "0"), ("1", "1"), ("2", "2"), ("3", "3")],
        "Vessels colored by fluoroscopy (0-3)",
    ),
    categorical(
        "thal",
        "Thalassemia",
        &[("1", "Normal"), ("2", "Fixed Defect"), ("3", "Reversible Defect")],
        "Thalassemia blood disorder type",
    ),
];

/// Result shown in the form's result panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskOutcome {
    High,
    Low,
    /// The predictor returned a label other than 0 or 1.
    Unexpected,
    /// Input could not be parsed, or the predictor failed.
    ProcessingError,
}

impl RiskOutcome {
    pub fn from_label(label: u8) -> Self {
        match label {
            1 => Self::High,
            0 => Self::Low,
            _ => Self::Unexpected,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "HIGH RISK",
            Self::Low => "LOW RISK",
            Self::Unexpected => "ERROR",
            Self::ProcessingError => "PROCESSING ERROR",
        }
    }

    /// CSS class for the result panel.
    pub fn css_class(&self) -> &'static str {
        match self {
            Self::Low => "result-low",
            _ => "result-high",
        }
    }
}

impl std::fmt::Display for RiskOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a submitted form could not be turned into a feature row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormInputError {
    Missing(&'static str),
    NotNumeric { field: &'static str, value: String },
}

impl std::fmt::Display for FormInputError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Missing(field) => write!(f, "missing field '{field}'"),
            Self::NotNumeric { field, value } => {
                write!(f, "field '{field}' is not numeric: {value:?}")
            }
        }
    }
}

/// Read every feature from submitted form values, in model input order.
///
/// `NaN` and infinities are rejected like any other non-numeric text.
pub fn parse_submission(values: &HashMap<String, String>) -> Result<Vec<f64>, FormInputError> {
    FEATURE_ORDER
        .iter()
        .map(|&field| {
            let raw = values.get(field).ok_or(FormInputError::Missing(field))?;
            raw.trim()
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| FormInputError::NotNumeric {
                    field,
                    value: raw.clone(),
                })
        })
        .collect()
}

/// Handlebars source for the form page.
///
/// Expects `fields` (serialized [`FIELDS`]) and, after a submission,
/// `prediction`, `result_class` and `now`.
pub const FORM_TEMPLATE: &str = r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>Heart Disease Analysis Dashboard</title>
  <style>
    :root {
      --bg-dark: #1e1e2f;
      --card-dark: #27293d;
      --text-light: #ffffff;
      --text-secondary: #a0a0a0;
      --accent-blue: #00bcd4;
      --accent-green: #00e676;
      --accent-red: #ff3d71;
      --border-dark: #3a3b50;
      --font-code: 'Roboto Mono', monospace;
    }
    body { font-family: var(--font-code); background: var(--bg-dark); color: var(--text-light);
           margin: 0; padding: 30px 0; display: flex; justify-content: center; min-height: 100vh; }
    .container { width: 95%; max-width: 1100px; margin: 0 auto; padding: 20px; }
    h1 { text-align: center; color: var(--accent-blue); margin-bottom: 40px; padding-bottom: 10px;
         border-bottom: 2px solid var(--border-dark); font-size: 1.8em; }
    .dashboard-grid { display: grid; grid-template-columns: repeat(2, 1fr); gap: 20px; margin-bottom: 30px; }
    .input-card { background: var(--card-dark); padding: 15px; border-radius: 8px;
                  border-left: 3px solid var(--accent-blue); display: flex; flex-direction: column;
                  justify-content: space-between; }
    label { display: block; font-weight: 700; color: var(--accent-blue); font-size: 0.9em; text-transform: uppercase; }
    .input-desc { display: block; font-size: 0.75em; color: var(--text-secondary); margin-bottom: 8px; }
    .unit-text { color: var(--text-secondary); font-weight: 400; }
    input[type="number"], select { width: 100%; padding: 8px; border: 1px solid var(--border-dark);
                                   border-radius: 4px; background: var(--bg-dark); color: var(--text-light);
                                   font-family: var(--font-code); box-sizing: border-box; }
    .action-section { grid-column: 1 / -1; display: flex; justify-content: space-between; align-items: center;
                      background: var(--card-dark); padding: 20px; border-radius: 8px; }
    input[type="submit"] { padding: 12px 30px; background-color: var(--accent-blue); color: var(--text-light);
                           border: none; border-radius: 6px; font-size: 1.1em; font-weight: 700; cursor: pointer;
                           font-family: var(--font-code); text-transform: uppercase; }
    .result-panel { width: 100%; max-width: 350px; padding: 15px 25px; border-radius: 8px; text-align: center; }
    .result-low { background-color: #1a362a; color: var(--accent-green); border: 1px solid var(--accent-green); }
    .result-high { background-color: #3b1b24; color: var(--accent-red); border: 1px solid var(--accent-red); }
    .result-label { font-size: 0.9em; text-transform: uppercase; margin-bottom: 5px; }
    .result-value { font-size: 1.8em; font-weight: 700; letter-spacing: 2px; }
    .disclaimer { font-size: 0.7em; color: var(--text-secondary); margin-top: 10px; }
    @media (max-width: 800px) {
      .dashboard-grid { grid-template-columns: 1fr; }
      .action-section { flex-direction: column; align-items: stretch; }
    }
  </style>
</head>
<body>
  <div class="container">
    <h1>CARDIAC RISK CLASSIFICATION PROTOCOL</h1>
    <form method="POST">
      <div class="dashboard-grid">
      {{#each fields}}
        <div class="input-card">
          <div>
            <label for="{{key}}">{{label}}{{#if unit}} <span class="unit-text">({{unit}})</span>{{/if}}</label>
            <span class="input-desc">{{description}}</span>
          </div>
          {{#if kind.continuous}}
          <input type="number" step="any" name="{{key}}" id="{{key}}" placeholder="{{kind.continuous.placeholder}}" required>
          {{else}}
          <select name="{{key}}" id="{{key}}" required>
            {{#each kind.categorical.options}}
            <option value="{{this.[0]}}">{{this.[1]}}</option>
            {{/each}}
          </select>
          {{/if}}
        </div>
      {{/each}}
        <div class="action-section">
          {{#if prediction}}
          <div class="result-panel {{result_class}}">
            <div class="result-label">FINAL CLASSIFICATION</div>
            <div class="result-value">{{prediction}}</div>
            <p class="disclaimer">Prediction executed at {{now}}</p>
          </div>
          {{/if}}
          <input type="submit" value="EXECUTE RISK ANALYSIS">
        </div>
      </div>
    </form>
    {{#if prediction}}
    <p class="disclaimer" style="text-align: center; font-size: 0.8em;">
      Disclaimer: This automated classification is for informational purposes only and does not substitute professional medical diagnosis.
    </p>
    {{/if}}
  </div>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;

    fn full_submission() -> HashMap<String, String> {
        [
            ("age", "52"),
            ("sex", "1"),
            ("cp", "0"),
            ("trestbps", "125"),
            ("chol", "212"),
            ("fbs", "0"),
            ("restecg", "1"),
            ("thalach", "168"),
            ("exang", "0"),
            ("oldpeak", "1.0"),
            ("slope", "2"),
            ("ca", "2"),
            ("thal", "3"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }

    #[test]
    fn test_fields_follow_feature_order() {
        let keys: Vec<_> = FIELDS.iter().map(|f| f.key).collect();
        assert_eq!(keys, FEATURE_ORDER);
    }

    #[test]
    fn test_parse_submission_in_feature_order() {
        let row = parse_submission(&full_submission()).unwrap();
        assert_eq!(row.len(), 13);
        assert_eq!(row[0], 52.0);
        assert_eq!(row[9], 1.0);
        assert_eq!(row[12], 3.0);
    }

    #[test]
    fn test_parse_submission_errors() {
        let mut values = full_submission();
        values.remove("thal");
        assert_eq!(parse_submission(&values), Err(FormInputError::Missing("thal")));

        let mut values = full_submission();
        values.insert("chol".into(), "high".into());
        assert!(matches!(
            parse_submission(&values),
            Err(FormInputError::NotNumeric { field: "chol", .. })
        ));
    }

    #[test]
    fn test_parse_submission_rejects_non_finite() {
        for bad in ["NaN", "nan", "inf", "-inf", "infinity"] {
            let mut values = full_submission();
            values.insert("chol".into(), bad.into());
            assert!(
                matches!(
                    parse_submission(&values),
                    Err(FormInputError::NotNumeric { field: "chol", .. })
                ),
                "{bad}"
            );
        }
    }

    #[test]
    fn test_outcome_labels() {
        assert_eq!(RiskOutcome::from_label(1).as_str(), "HIGH RISK");
        assert_eq!(RiskOutcome::from_label(0).as_str(), "LOW RISK");
        assert_eq!(RiskOutcome::from_label(7).as_str(), "ERROR");
        assert_eq!(RiskOutcome::ProcessingError.to_string(), "PROCESSING ERROR");
    }
}
