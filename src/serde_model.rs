//! Network persistence (feature: `serde`).
//!
//! The on-disk format mirrors the flat-array state of a [`Network`] field by
//! field, so a save/load round trip reproduces the weights, the offsets and
//! the live context neurons exactly. Activations are stored by registry name
//! (plus slope where applicable) and resolved through [`Activation`]'s
//! `FromStr` impl on load.
//!
//! Loading runs [`Network::validate_layout`], so a hand-edited file with
//! inconsistent offsets is rejected instead of panicking later in `compute`.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{Activation, Error, Network, Result};

pub const MODEL_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedNetwork {
    pub format_version: u32,
    pub input_count: usize,
    pub output_count: usize,
    pub begin_training: usize,
    pub end_training: usize,
    /// Per-layer arrays, output layer first.
    pub layer_counts: Vec<usize>,
    pub layer_feed_counts: Vec<usize>,
    pub layer_context_count: Vec<usize>,
    pub layer_index: Vec<usize>,
    pub weight_index: Vec<usize>,
    pub context_target_offset: Vec<usize>,
    pub context_target_size: Vec<usize>,
    pub bias_activation: Vec<f64>,
    pub activation_functions: Vec<SerializedActivation>,
    pub weights: Vec<f64>,
    pub layer_output: Vec<f64>,
    pub layer_sums: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedActivation {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slope: Option<f64>,
}

impl From<Activation> for SerializedActivation {
    fn from(value: Activation) -> Self {
        Self {
            name: value.name().to_owned(),
            slope: value.slope(),
        }
    }
}

impl SerializedActivation {
    fn resolve(&self) -> Result<Activation> {
        let act: Activation = self.name.parse()?;
        let act = match (act, self.slope) {
            (Activation::Elliott { .. }, Some(slope)) => Activation::Elliott { slope },
            (Activation::ElliottSymmetric { .. }, Some(slope)) => {
                Activation::ElliottSymmetric { slope }
            }
            (_, None) => act,
            (other, Some(_)) => {
                return Err(Error::InvalidData(format!(
                    "activation {other} does not take a slope"
                )));
            }
        };
        act.validate()?;
        Ok(act)
    }
}

impl From<&Network> for SerializedNetwork {
    fn from(net: &Network) -> Self {
        Self {
            format_version: MODEL_FORMAT_VERSION,
            input_count: net.input_count,
            output_count: net.output_count,
            begin_training: net.begin_training,
            end_training: net.end_training,
            layer_counts: net.layer_counts.clone(),
            layer_feed_counts: net.layer_feed_counts.clone(),
            layer_context_count: net.layer_context_count.clone(),
            layer_index: net.layer_index.clone(),
            weight_index: net.weight_index.clone(),
            context_target_offset: net.context_target_offset.clone(),
            context_target_size: net.context_target_size.clone(),
            bias_activation: net.bias_activation.clone(),
            activation_functions: net
                .activation_functions
                .iter()
                .map(|&a| SerializedActivation::from(a))
                .collect(),
            weights: net.weights.clone(),
            layer_output: net.layer_output.clone(),
            layer_sums: net.layer_sums.clone(),
        }
    }
}

impl TryFrom<SerializedNetwork> for Network {
    type Error = Error;

    fn try_from(value: SerializedNetwork) -> std::result::Result<Self, Self::Error> {
        if value.format_version != MODEL_FORMAT_VERSION {
            return Err(Error::InvalidData(format!(
                "unsupported model format_version {}; expected {}",
                value.format_version, MODEL_FORMAT_VERSION
            )));
        }

        let activation_functions = value
            .activation_functions
            .iter()
            .enumerate()
            .map(|(i, a)| {
                a.resolve()
                    .map_err(|e| Error::InvalidData(format!("layer {i} activation: {e}")))
            })
            .collect::<Result<Vec<_>>>()?;

        let net = Network {
            input_count: value.input_count,
            output_count: value.output_count,
            layer_counts: value.layer_counts,
            layer_feed_counts: value.layer_feed_counts,
            layer_context_count: value.layer_context_count,
            layer_index: value.layer_index,
            weight_index: value.weight_index,
            context_target_offset: value.context_target_offset,
            context_target_size: value.context_target_size,
            bias_activation: value.bias_activation,
            activation_functions,
            begin_training: value.begin_training,
            end_training: value.end_training,
            weights: value.weights,
            layer_output: value.layer_output,
            layer_sums: value.layer_sums,
        };
        net.validate_layout()?;
        Ok(net)
    }
}

impl Network {
    /// Serialize the network to a pretty-printed JSON string.
    pub fn to_json_string_pretty(&self) -> Result<String> {
        let ser = SerializedNetwork::from(self);
        serde_json::to_string_pretty(&ser)
            .map_err(|e| Error::InvalidData(format!("failed to serialize network: {e}")))
    }

    /// Serialize the network to a compact JSON string.
    pub fn to_json_string(&self) -> Result<String> {
        let ser = SerializedNetwork::from(self);
        serde_json::to_string(&ser)
            .map_err(|e| Error::InvalidData(format!("failed to serialize network: {e}")))
    }

    pub fn from_json_str(s: &str) -> Result<Self> {
        let ser: SerializedNetwork = serde_json::from_str(s)
            .map_err(|e| Error::InvalidData(format!("failed to parse network json: {e}")))?;
        ser.try_into()
    }

    /// Save the network to a JSON file (pretty-printed).
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let s = self.to_json_string_pretty()?;
        let p = path.as_ref();
        std::fs::write(p, s)
            .map_err(|e| Error::InvalidData(format!("failed to write {}: {e}", p.display())))?;
        Ok(())
    }

    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let p = path.as_ref();
        let s = std::fs::read_to_string(p)
            .map_err(|e| Error::InvalidData(format!("failed to read {}: {e}", p.display())))?;
        Self::from_json_str(&s)
    }
}
