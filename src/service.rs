use crate::config::Config;
use crate::core::{
    assemble, decode, select, Decoded, RawInput, SampleResult, Sampler, SizePolicy, SourceFormat,
};
use crate::error::{EngineError, Result};
use crate::protocol::PerformSamplingRequest;
use crate::sampling::UniformSampler;
use base64::Engine;
use tracing::{debug, info, info_span, warn};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Validating,
    Decoding,
    Selecting,
    Assembling,
    Done,
}

/// Stateless sampling pipeline: validate, decode, select, assemble.
///
/// Holds only configuration, so one instance can serve concurrent requests.
#[derive(Debug, Clone)]
pub struct SamplingService {
    max_file_size: usize,
    seed: Option<u64>,
}

impl SamplingService {
    pub fn new(max_file_size: usize, seed: Option<u64>) -> Self {
        Self {
            max_file_size,
            seed,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.max_file_size, config.sample_seed)
    }

    // 配置了种子时每个请求都从同一状态开始
    fn sampler(&self) -> UniformSampler {
        match self.seed {
            Some(seed) => UniformSampler::seeded(seed),
            None => UniformSampler::from_entropy(),
        }
    }

    /// Sampling operation behind `POST /api/sample`: base64 file in, sampled
    /// rows out. The handler turns the outcome into a `SamplingResponse`.
    pub fn handle_request(&self, request: PerformSamplingRequest) -> Result<SampleResult> {
        let encoded = request
            .file_bytes_base64
            .as_deref()
            .map(strip_data_url)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| EngineError::InvalidInput("no file provided".to_string()))?;

        // 解码前按下界估算大小，超限直接失败
        let lower_bound = (encoded.len() / 4 * 3).saturating_sub(2);
        if lower_bound > self.max_file_size {
            return Err(EngineError::TooLarge {
                size: Some(lower_bound),
                limit: self.max_file_size,
            });
        }

        let data = base64::engine::general_purpose::STANDARD
            .decode(encoded)
            .map_err(|e| {
                EngineError::InvalidInput(format!("file content is not valid base64: {}", e))
            })?;

        let format = request
            .format
            .as_deref()
            .filter(|tag| !tag.trim().is_empty())
            .map(str::parse::<SourceFormat>)
            .transpose()?;

        let input =
            RawInput::new(data, request.file_name.unwrap_or_default()).with_format(format);

        self.execute(
            &input,
            request.has_header,
            request.size_policy_kind.as_deref(),
            request.size_policy_value,
        )
    }

    /// Validate the raw policy fields, then run the pipeline.
    pub fn execute(
        &self,
        input: &RawInput,
        has_header: bool,
        policy_kind: Option<&str>,
        policy_value: Option<f64>,
    ) -> Result<SampleResult> {
        let span = info_span!("sampling", request_id = %Uuid::new_v4(), file = %input.file_name);
        let _guard = span.enter();

        let policy = match (policy_kind, policy_value) {
            (_, None) => Err(EngineError::InvalidInput(
                "sampling value is required".to_string(),
            )),
            (None, Some(_)) => Err(EngineError::InvalidInput(
                "sampling type is required".to_string(),
            )),
            (Some(kind), Some(value)) => SizePolicy::from_raw(kind, value),
        };

        match policy {
            Ok(policy) => self.run(input, has_header, policy),
            Err(e) => {
                warn!(stage = ?Stage::Validating, "Sampling failed: {}", e);
                Err(e)
            }
        }
    }

    pub fn run(
        &self,
        input: &RawInput,
        has_header: bool,
        policy: SizePolicy,
    ) -> Result<SampleResult> {
        let mut sampler = self.sampler();
        self.run_with(input, has_header, policy, &mut sampler)
    }

    pub fn run_with(
        &self,
        input: &RawInput,
        has_header: bool,
        policy: SizePolicy,
        sampler: &mut dyn Sampler,
    ) -> Result<SampleResult> {
        let mut stage = Stage::Validating;
        let outcome = self.pipeline(input, has_header, policy, sampler, &mut stage);

        match &outcome {
            Ok(result) => info!(
                "Sampled {} of {} rows from {} bytes",
                result.rows.len(),
                result.total_rows,
                input.data.len()
            ),
            Err(e) => warn!(stage = ?stage, "Sampling failed: {}", e),
        }

        outcome
    }

    fn pipeline(
        &self,
        input: &RawInput,
        has_header: bool,
        policy: SizePolicy,
        sampler: &mut dyn Sampler,
        stage: &mut Stage,
    ) -> Result<SampleResult> {
        self.validate(input, policy)?;
        let format = input.resolve_format()?;

        advance(stage, Stage::Decoding);
        let Decoded { header, rows } = decode(&input.data, format, has_header)?;

        advance(stage, Stage::Selecting);
        let indices = select(rows.len(), policy, sampler)?;

        advance(stage, Stage::Assembling);
        let result = assemble(rows, header, &indices)?;

        advance(stage, Stage::Done);
        Ok(result)
    }

    fn validate(&self, input: &RawInput, policy: SizePolicy) -> Result<()> {
        if input.data.is_empty() {
            return Err(EngineError::InvalidInput("file is empty".to_string()));
        }
        if input.data.len() > self.max_file_size {
            return Err(EngineError::TooLarge {
                size: Some(input.data.len()),
                limit: self.max_file_size,
            });
        }
        policy.validate()
    }
}

fn advance(stage: &mut Stage, next: Stage) {
    debug!("Stage {:?} -> {:?}", stage, next);
    *stage = next;
}

/// Accepts both bare base64 and a `data:<mime>;base64,<payload>` URL.
fn strip_data_url(encoded: &str) -> &str {
    let encoded = encoded.trim();
    if encoded.starts_with("data:") {
        if let Some((_, payload)) = encoded.split_once(',') {
            return payload;
        }
    }
    encoded
}
