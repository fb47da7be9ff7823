//! Snippet builder: renders "call `function` on these samples and report
//! the result" as a self-contained source fragment.
//!
//! The fragment prints exactly one outcome line:
//!
//! ```text
//! @@parity:ok <type name> <repr of result>
//! @@parity:err <exception class> <message>
//! ```

use tracing::trace;

use crate::error::SnippetError;
use crate::matrix::{SampleValue, TypeMatrix, TypeSample};

pub const OUTCOME_MARKER: &str = "@@parity:";

/// Name bound to the result inside the fragment.
pub const RESULT_BINDING: &str = "__parity_result";

#[derive(Debug, Clone)]
pub struct Snippet {
    pub function: String,
    pub samples: Vec<TypeSample>,
    /// The call expression, e.g. `bin(-5)`.
    pub call: String,
    pub source: String,
}

#[derive(Debug, Clone)]
pub struct SnippetBuilder {
    check_syntax: bool,
}

impl SnippetBuilder {
    pub fn new() -> Self {
        Self { check_syntax: true }
    }

    /// Skips the parse check on generated fragments.
    pub fn without_syntax_check(mut self) -> Self {
        self.check_syntax = false;
        self
    }

    /// Renders a sample as source: its literal, or its construction expression.
    pub fn render_sample(sample: &TypeSample) -> Result<String, SnippetError> {
        match &sample.value {
            SampleValue::Literal(value) => value.literal().ok_or_else(|| {
                SnippetError::unsupported_sample_kind(sample.type_name, format!("{value:?}"))
            }),
            SampleValue::Expr(source) => Ok(source.clone()),
        }
    }

    pub fn build(&self, function: &str, samples: &[&TypeSample]) -> Result<Snippet, SnippetError> {
        let args = samples
            .iter()
            .map(|s| Self::render_sample(s))
            .collect::<Result<Vec<_>, _>>()?
            .join(", ");
        let call = format!("{function}({args})");
        let source = render_source(&call);

        if self.check_syntax && !is_valid_source(&source)? {
            return Err(SnippetError::invalid_syntax(function, args));
        }
        trace!(call = %call, "built snippet");

        Ok(Snippet {
            function: function.to_string(),
            samples: samples.iter().map(|s| (*s).clone()).collect(),
            call,
            source,
        })
    }

    /// Builds a probe snippet for every sample in the matrix so that a
    /// malformed entry is reported before any backend runs.
    pub fn check_matrix(&self, matrix: &TypeMatrix) -> Result<usize, SnippetError> {
        let mut checked = 0;
        for type_name in matrix.type_names() {
            let samples = matrix
                .sample_for(type_name)
                .map_err(|_| SnippetError::unsupported_sample_kind(type_name, "<missing>"))?;
            for sample in samples {
                self.build("repr", &[sample])?;
                checked += 1;
            }
        }
        Ok(checked)
    }
}

impl Default for SnippetBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn render_source(call: &str) -> String {
    format!(
        r"try:
    {RESULT_BINDING} = {call}
except Exception as __parity_error:
    print('{OUTCOME_MARKER}err ' + type(__parity_error).__name__ + ' ' + str(__parity_error).replace('\n', '\\n'))
else:
    print('{OUTCOME_MARKER}ok ' + type({RESULT_BINDING}).__name__ + ' ' + repr({RESULT_BINDING}).replace('\n', '\\n'))
"
    )
}

fn is_valid_source(source: &str) -> Result<bool, SnippetError> {
    let mut parser = tree_sitter::Parser::new();
    parser
        .set_language(&tree_sitter_python::LANGUAGE.into())
        .map_err(|e| SnippetError::ParserSetup {
            message: e.to_string(),
        })?;
    let tree = parser
        .parse(source, None)
        .ok_or_else(|| SnippetError::ParserSetup {
            message: "parse returned no tree".to_string(),
        })?;
    Ok(!tree.root_node().has_error())
}
