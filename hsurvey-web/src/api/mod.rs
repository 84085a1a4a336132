//! HTTP handlers for hsurvey-web

pub mod analysis;
pub mod export;
pub mod form;
pub mod health;
mod html;

pub use analysis::{analysis_page, summary_csv_download};
pub use export::export_data;
pub use form::{serve_form, submit, success_page};
pub use health::health_routes;
