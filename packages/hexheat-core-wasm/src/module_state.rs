use lazy_static::lazy_static;
use parking_lot::Mutex;

use crate::models::NormalizationStats;

// Module state shared by every normalization call made through the wasm exports
pub struct ModuleState {
    pub records_processed: usize,
    pub fallbacks: usize,
    pub runs: usize,
}

// Create a global static instance of the module state
lazy_static! {
    static ref MODULE_STATE: Mutex<ModuleState> = Mutex::new(ModuleState::new());
}

impl ModuleState {
    pub fn new() -> Self {
        ModuleState {
            records_processed: 0,
            fallbacks: 0,
            runs: 0,
        }
    }

    pub fn global() -> &'static Mutex<ModuleState> {
        &*MODULE_STATE
    }

    pub fn record_run(&mut self, records: usize, fallbacks: usize) {
        self.runs += 1;
        self.records_processed += records;
        self.fallbacks += fallbacks;
    }

    pub fn stats(&self) -> NormalizationStats {
        NormalizationStats {
            records_processed: self.records_processed,
            fallbacks: self.fallbacks,
            runs: self.runs,
        }
    }

    pub fn reset(&mut self) {
        *self = ModuleState::new();
    }
}

impl Default for ModuleState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_and_reset() {
        let mut state = ModuleState::new();
        state.record_run(10, 2);
        state.record_run(5, 0);
        assert_eq!(
            state.stats(),
            NormalizationStats {
                records_processed: 15,
                fallbacks: 2,
                runs: 2,
            }
        );
        state.reset();
        assert_eq!(state.stats(), NormalizationStats::default());
    }
}
