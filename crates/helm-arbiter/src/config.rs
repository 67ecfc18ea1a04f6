//! Cycle-level arbiter settings.

/// Knobs for status publishing.  Everything has a default; under the
/// `serde` feature missing fields fall back to it.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ArbiterConfig {
    /// Minimum seconds between summary and per-behavior status postings.
    /// Zero publishes every cycle.
    pub status_interval_secs: f64,

    /// Post the mode summary whenever it changes.
    pub publish_modes: bool,

    /// Warnings kept for [`Arbiter::warnings`][crate::Arbiter::warnings];
    /// older ones are dropped.
    pub warning_history: usize,

    pub summary_var:    String,
    pub mode_var:       String,
    pub life_event_var: String,
    pub status_var:     String,
    pub warning_var:    String,
}

impl Default for ArbiterConfig {
    fn default() -> Self {
        Self {
            status_interval_secs: 1.0,
            publish_modes:        true,
            warning_history:      256,
            summary_var:          "HELM_SUMMARY".into(),
            mode_var:             "HELM_MODE".into(),
            life_event_var:       "HELM_LIFE_EVENT".into(),
            status_var:           "HELM_BHV_STATUS".into(),
            warning_var:          "HELM_WARNING".into(),
        }
    }
}
