use crate::analysis::AnalysisBundle;
use crate::session::GenerateInput;

// Single-slot holder for the current session's bundle.
#[derive(Debug, Clone, Default)]
pub struct ResultStore {
    bundle: AnalysisBundle,
    generated: bool,
    input: Option<GenerateInput>, // What the stored bundle was generated from.
}

impl ResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, bundle: AnalysisBundle, input: GenerateInput) {
        self.bundle = bundle;
        self.input = Some(input);
        self.generated = true;
    }

    pub fn get(&self) -> Option<&AnalysisBundle> {
        self.generated.then_some(&self.bundle)
    }

    // The slot as the panels see it: empty defaults until something is generated.
    pub fn bundle(&self) -> &AnalysisBundle {
        &self.bundle
    }

    pub fn is_generated(&self) -> bool {
        self.generated
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    // True when the stored bundle came from exactly this input.
    pub fn matches(&self, input: &GenerateInput) -> bool {
        self.generated && self.input.as_ref() == Some(input)
    }
}
