use serde::{Deserialize, Serialize};

#[derive(Serialize, Debug)]
pub struct SummarizationPayload<'a> {
    pub inputs: &'a str,
    pub parameters: SummarizationParameters,
}

#[derive(Serialize, Debug, PartialEq, Eq)]
pub struct SummarizationParameters {
    pub min_length: u32,
    pub max_length: u32,
    pub do_sample: bool,
}

#[derive(Deserialize, Debug)]
pub struct SummarizationOutput {
    pub summary_text: String,
}

/// Error body the inference endpoint sends with non-2xx statuses, e.g. while a model loads.
#[allow(dead_code)]
#[derive(Deserialize, Debug)]
pub struct InferenceError {
    pub error: String,
    #[serde(default)]
    pub estimated_time: Option<f32>,
}
