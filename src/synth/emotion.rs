//! Emotion steering for the cloning service.
//!
//! An [`EmotionControl`] either reuses the reference clip's own delivery or
//! supplies an eight-way [`EmotionVector`] plus an overall strength.
//!
//! | Preset | Control |
//! |--------|---------|
//! | `natural` | same as the reference |
//! | `happy` | happy 0.8, calm 0.2 |
//! | `sad` | sad 0.8, melancholic 0.2 |
//! | `surprised` | surprised 0.8 |
//! | `angry` | angry 0.8 |
//! | `calm` | calm 0.9 |

use serde::{Deserialize, Serialize};

use super::client::SynthesisError;

/// Tolerance on the "weights sum to at most 1" rule.
const SUM_TOLERANCE: f32 = 1e-4;

// ---------------------------------------------------------------------------
// EmotionVector
// ---------------------------------------------------------------------------

/// Per-emotion weights, each in `[0, 1]`, summing to at most 1.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EmotionVector {
    pub happy: f32,
    pub angry: f32,
    pub sad: f32,
    pub afraid: f32,
    pub disgusted: f32,
    pub melancholic: f32,
    pub surprised: f32,
    pub calm: f32,
}

impl EmotionVector {
    /// Names in wire order.
    pub const NAMES: [&'static str; 8] = [
        "happy",
        "angry",
        "sad",
        "afraid",
        "disgusted",
        "melancholic",
        "surprised",
        "calm",
    ];

    /// `(name, weight)` pairs in wire order.
    pub fn entries(&self) -> [(&'static str, f32); 8] {
        let w = self.as_array();
        let mut out = [("", 0.0); 8];
        for (i, slot) in out.iter_mut().enumerate() {
            *slot = (Self::NAMES[i], w[i]);
        }
        out
    }

    fn as_array(&self) -> [f32; 8] {
        [
            self.happy,
            self.angry,
            self.sad,
            self.afraid,
            self.disgusted,
            self.melancholic,
            self.surprised,
            self.calm,
        ]
    }

    /// Sum of all eight weights.
    pub fn total(&self) -> f32 {
        self.as_array().iter().sum()
    }

    /// Reject out-of-range weights or a sum above 1.
    pub fn validate(&self) -> Result<(), SynthesisError> {
        for (name, weight) in self.entries() {
            if !(0.0..=1.0).contains(&weight) {
                return Err(SynthesisError::InvalidEmotion(format!(
                    "{name} weight {weight} is outside [0, 1]"
                )));
            }
        }
        let total = self.total();
        if total > 1.0 + SUM_TOLERANCE {
            return Err(SynthesisError::InvalidEmotion(format!(
                "weights sum to {total:.3}, above 1"
            )));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// EmotionControl
// ---------------------------------------------------------------------------

/// How the service should choose the delivery of the generated speech.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "method")]
pub enum EmotionControl {
    /// Copy the emotion of the reference clip.
    SameAsReference,
    /// Steer with explicit weights; `strength` scales the whole vector.
    Vectors { weights: EmotionVector, strength: f32 },
}

impl EmotionControl {
    /// Names accepted by [`preset`](Self::preset).
    pub const PRESET_NAMES: [&'static str; 6] =
        ["natural", "happy", "sad", "surprised", "angry", "calm"];

    /// Built-in preset by name; vector presets use `strength`.
    pub fn preset(name: &str, strength: f32) -> Option<Self> {
        let weights = match name.to_ascii_lowercase().as_str() {
            "natural" => return Some(Self::SameAsReference),
            "happy" => EmotionVector {
                happy: 0.8,
                calm: 0.2,
                ..EmotionVector::default()
            },
            "sad" => EmotionVector {
                sad: 0.8,
                melancholic: 0.2,
                ..EmotionVector::default()
            },
            "surprised" => EmotionVector {
                surprised: 0.8,
                ..EmotionVector::default()
            },
            "angry" => EmotionVector {
                angry: 0.8,
                ..EmotionVector::default()
            },
            "calm" => EmotionVector {
                calm: 0.9,
                ..EmotionVector::default()
            },
            _ => return None,
        };
        Some(Self::Vectors { weights, strength })
    }

    /// Label the service expects for this control method.
    pub fn method_label(&self) -> &'static str {
        match self {
            EmotionControl::SameAsReference => "Same as the voice reference",
            EmotionControl::Vectors { .. } => "Use emotion vectors",
        }
    }

    /// Check weights and strength before anything is sent.
    pub fn validate(&self) -> Result<(), SynthesisError> {
        match self {
            EmotionControl::SameAsReference => Ok(()),
            EmotionControl::Vectors { weights, strength } => {
                if !(0.0..=1.0).contains(strength) {
                    return Err(SynthesisError::InvalidEmotion(format!(
                        "strength {strength} is outside [0, 1]"
                    )));
                }
                weights.validate()
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
