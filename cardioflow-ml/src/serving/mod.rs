//! Interactive risk form served over HTTP.
//!
//! `GET /` renders the thirteen-field form, `POST /` classifies one patient
//! and renders the form again with the result panel filled in. Prediction
//! failures never escape as HTTP errors; they render as `PROCESSING ERROR`.

pub mod context;
pub mod form;
pub mod server;

pub use context::AppContext;
pub use form::{FIELDS, FieldKind, FormField, RiskOutcome};
pub use server::{router, serve};
