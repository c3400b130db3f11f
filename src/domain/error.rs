//! Domain error types.

/// A parse error with position information for condition parsing.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("parse error at position {position}: {message}")]
pub struct ParseError {
    pub message: String,
    pub position: usize,
}

impl ParseError {
    /// Format the error with a caret pointing at the error position in the input.
    pub fn display_with_context(&self, input: &str) -> String {
        let caret = " ".repeat(self.position) + "^";
        format!(
            "{input}\n{caret}\n{err}",
            input = input,
            caret = caret,
            err = self
        )
    }
}

/// Reasons a backtest refuses to run.
///
/// Indicator- and tool-level insufficiency never surfaces here; those degrade
/// to neutral values. Only the simulator hard-fails.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BacktestError {
    #[error("insufficient data: have {bars} bars, need {minimum}")]
    InsufficientData { bars: usize, minimum: usize },

    #[error("invalid rule: {reason}")]
    InvalidRule { reason: String },

    #[error("invalid initial capital: {capital}")]
    InvalidCapital { capital: f64 },
}

/// Top-level error type for bullbear.
#[derive(Debug, thiserror::Error)]
pub enum BullBearError {
    #[error("data error: {reason}")]
    Data { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error(transparent)]
    RuleParse(#[from] ParseError),

    #[error(transparent)]
    Backtest(#[from] BacktestError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl BullBearError {
    /// Process exit status: 1 I/O, 2 config, 3 data, 4 rule, 5 backtest.
    pub fn exit_code(&self) -> u8 {
        match self {
            BullBearError::Io(_) => 1,
            BullBearError::ConfigParse { .. }
            | BullBearError::ConfigMissing { .. }
            | BullBearError::ConfigInvalid { .. } => 2,
            BullBearError::Data { .. } => 3,
            BullBearError::RuleParse(_)
            | BullBearError::Backtest(BacktestError::InvalidRule { .. }) => 4,
            BullBearError::Backtest(_) => 5,
        }
    }
}

impl From<&BullBearError> for std::process::ExitCode {
    fn from(err: &BullBearError) -> Self {
        std::process::ExitCode::from(err.exit_code())
    }
}
