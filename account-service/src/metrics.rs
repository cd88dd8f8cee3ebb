use anyhow::Result;
use axum::body::Body;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::Response;
use prometheus::{Encoder, IntCounterVec, Opts, Registry, TextEncoder};

#[derive(Clone)]
pub struct AuthMetrics {
    registry: Registry,
    login_attempts: IntCounterVec,
    tokens_issued: IntCounterVec,
    gate_decisions: IntCounterVec,
}

impl AuthMetrics {
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let login_attempts = IntCounterVec::new(
            Opts::new(
                "auth_login_attempts_total",
                "Count of login attempts grouped by outcome",
            ),
            &["outcome"],
        )?;
        registry.register(Box::new(login_attempts.clone()))?;

        let tokens_issued = IntCounterVec::new(
            Opts::new("auth_tokens_issued_total", "Count of signed tokens by kind"),
            &["kind"],
        )?;
        registry.register(Box::new(tokens_issued.clone()))?;

        let gate_decisions = IntCounterVec::new(
            Opts::new(
                "auth_gate_decisions_total",
                "Count of request gate decisions grouped by outcome",
            ),
            &["outcome"],
        )?;
        registry.register(Box::new(gate_decisions.clone()))?;

        Ok(Self {
            registry,
            login_attempts,
            tokens_issued,
            gate_decisions,
        })
    }

    pub fn login_attempt(&self, outcome: &str) {
        self.login_attempts.with_label_values(&[outcome]).inc();
    }

    pub fn token_issued(&self, kind: &str) {
        self.tokens_issued.with_label_values(&[kind]).inc();
    }

    pub fn gate_decision(&self, outcome: &str) {
        self.gate_decisions.with_label_values(&[outcome]).inc();
    }

    pub fn render(&self) -> Result<Response> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        let response = Response::builder()
            .status(StatusCode::OK)
            .header(
                header::CONTENT_TYPE,
                HeaderValue::from_static("text/plain; version=0.0.4"),
            )
            .body(Body::from(buffer))?;
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_show_up_in_exposition() {
        let metrics = AuthMetrics::new().expect("registry");
        metrics.login_attempt("success");
        metrics.token_issued("access");
        metrics.gate_decision("denied");

        let families = metrics.registry.gather();
        let names: Vec<&str> = families.iter().map(|family| family.get_name()).collect();
        assert!(names.contains(&"auth_login_attempts_total"));
        assert!(names.contains(&"auth_tokens_issued_total"));
        assert!(names.contains(&"auth_gate_decisions_total"));
    }
}
