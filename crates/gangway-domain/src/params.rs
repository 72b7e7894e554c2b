//! Call-scoped generation parameters

use serde::{Deserialize, Serialize};

/// Sampling parameters for a single generation call
///
/// Both fields are deliberately tri-state: `None` means "do not send the
/// parameter", letting the model or the generator's own default apply. This
/// is distinct from setting a parameter to the provider's documented default
/// value.
///
/// Parameters travel with the call. A generator must never store per-call
/// overrides in shared mutable state; concurrent extractions against one
/// generator instance each see exactly the parameters they passed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    /// Sampling temperature override; `None` leaves the model default
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Maximum tokens to generate; `None` uses the generator's configured default
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl GenerationParams {
    /// Parameters that leave every knob at its default
    pub fn unset() -> Self {
        Self::default()
    }

    /// Set the temperature override
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set the max-tokens override
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unset_serializes_to_empty_object() {
        let json = serde_json::to_string(&GenerationParams::unset()).unwrap();
        assert_eq!(json, "{}");
    }

    #[test]
    fn test_builders() {
        let params = GenerationParams::unset()
            .with_temperature(0.2)
            .with_max_tokens(2048);
        assert_eq!(params.temperature, Some(0.2));
        assert_eq!(params.max_tokens, Some(2048));
    }
}
