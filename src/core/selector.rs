use crate::core::sampler::Sampler;
use crate::error::{EngineError, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum SizePolicy {
    Count(i64),
    Percentage(f64),
}

impl SizePolicy {
    /// Build a policy from the transport's `(kind, value)` pair.
    pub fn from_raw(kind: &str, value: f64) -> Result<Self> {
        if !value.is_finite() {
            return Err(EngineError::InvalidPolicy(format!(
                "sampling value must be a finite number, got {}",
                value
            )));
        }

        match kind.trim().to_ascii_lowercase().as_str() {
            "number" | "count" => {
                if value.fract() != 0.0 {
                    return Err(EngineError::InvalidPolicy(format!(
                        "row count must be a whole number, got {}",
                        value
                    )));
                }
                Ok(Self::Count(value as i64))
            }
            "percentage" | "percent" => Ok(Self::Percentage(value)),
            other => Err(EngineError::InvalidPolicy(format!(
                "unknown sampling type '{}'",
                other
            ))),
        }
    }

    pub fn validate(&self) -> Result<()> {
        match *self {
            Self::Count(n) if n < 0 => Err(EngineError::InvalidPolicy(format!(
                "row count must not be negative, got {}",
                n
            ))),
            Self::Percentage(p) if !p.is_finite() || p <= 0.0 => Err(EngineError::InvalidPolicy(
                format!("percentage must be above 0, got {}", p),
            )),
            _ => Ok(()),
        }
    }

    /// Resolve against a concrete row total; never exceeds `total`.
    pub fn resolve(&self, total: usize) -> Result<usize> {
        self.validate()?;

        match *self {
            Self::Count(n) => Ok(usize::try_from(n).unwrap_or(usize::MAX).min(total)),
            Self::Percentage(p) => {
                // 四舍五入（half-up），再截断到 [0, total]
                let exact = total as f64 * p / 100.0;
                let rounded = (exact + 0.5).floor();
                Ok((rounded as usize).min(total))
            }
        }
    }
}

/// Pick row indices for `policy`, ascending and duplicate-free.
pub fn select(
    total_rows: usize,
    policy: SizePolicy,
    sampler: &mut dyn Sampler,
) -> Result<Vec<usize>> {
    let k = policy.resolve(total_rows)?;
    if k == 0 {
        return Ok(Vec::new());
    }

    let mut indices = sampler.draw(total_rows, k);
    // 抽样是选择而非洗牌：按原始顺序输出
    indices.sort_unstable();

    Ok(indices)
}
