use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SnippetError {
    #[error("sample of type '{type_name}' has no literal form: {sample}")]
    UnsupportedSampleKind { type_name: String, sample: String },

    #[error("generated snippet for {function}({args}) is not valid source")]
    InvalidSyntax { function: String, args: String },

    #[error("failed to set up source parser: {message}")]
    ParserSetup { message: String },
}

impl SnippetError {
    pub fn unsupported_sample_kind(type_name: impl Into<String>, sample: impl Into<String>) -> Self {
        Self::UnsupportedSampleKind {
            type_name: type_name.into(),
            sample: sample.into(),
        }
    }

    pub fn invalid_syntax(function: impl Into<String>, args: impl Into<String>) -> Self {
        Self::InvalidSyntax {
            function: function.into(),
            args: args.into(),
        }
    }
}
