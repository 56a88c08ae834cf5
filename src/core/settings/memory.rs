use serde::Serialize;

/// Feedback shown next to the memory slider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoryAdvice {
    Risky,
    Low,
    Optimal,
    Good,
    Excessive,
}

impl MemoryAdvice {
    pub fn for_gigabytes(gb: u32) -> Self {
        match gb {
            0..=1 => MemoryAdvice::Risky,
            2..=3 => MemoryAdvice::Low,
            4..=6 => MemoryAdvice::Optimal,
            7..=8 => MemoryAdvice::Good,
            _ => MemoryAdvice::Excessive,
        }
    }
}

/// Physical memory of this machine in whole gigabytes, used as the slider limit.
pub fn total_memory_gb() -> u32 {
    let mut system = sysinfo::System::new();
    system.refresh_memory();
    (system.total_memory() / (1024 * 1024 * 1024)) as u32
}

/// Clamp a requested allocation to `1..=total` (total of 0 means unknown).
pub fn clamp_memory_gb(requested: u32, total: u32) -> u32 {
    let upper = if total == 0 { requested.max(1) } else { total };
    requested.clamp(1, upper.max(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advice_thresholds() {
        assert_eq!(MemoryAdvice::for_gigabytes(1), MemoryAdvice::Risky);
        assert_eq!(MemoryAdvice::for_gigabytes(3), MemoryAdvice::Low);
        assert_eq!(MemoryAdvice::for_gigabytes(4), MemoryAdvice::Optimal);
        assert_eq!(MemoryAdvice::for_gigabytes(8), MemoryAdvice::Good);
        assert_eq!(MemoryAdvice::for_gigabytes(16), MemoryAdvice::Excessive);
    }

    #[test]
    fn clamp_respects_machine_limit() {
        assert_eq!(clamp_memory_gb(12, 8), 8);
        assert_eq!(clamp_memory_gb(0, 8), 1);
        assert_eq!(clamp_memory_gb(6, 0), 6);
    }
}
