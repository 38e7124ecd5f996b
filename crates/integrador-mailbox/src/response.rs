//! Turning matched response text into a structured result.

use crate::error::{IntegradorError, IntegradorResult};
use crate::xml_text::{element_text, inner_xml};

pub trait ResponseParser {
    type Output;

    fn parse(&self, raw: &str) -> IntegradorResult<Self::Output>;
}

/// Response document produced by the processor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntegradorResponse {
    /// `Identificador/Valor`, the echoed session id.
    pub identifier: String,
    /// `IntegradorResposta/Codigo`, e.g. `AP` on acceptance.
    pub code: Option<String>,
    /// `IntegradorResposta/Valor`.
    pub value: Option<String>,
    /// Inner markup of `Resposta`, left for schema-specific decoding.
    pub payload: Option<String>,
    pub error: Option<String>,
    pub raw: String,
}

impl IntegradorResponse {
    pub fn is_error(&self) -> bool {
        self.error.as_deref().is_some_and(|error| !error.is_empty())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct IntegradorResponseParser;

impl ResponseParser for IntegradorResponseParser {
    type Output = IntegradorResponse;

    fn parse(&self, raw: &str) -> IntegradorResult<IntegradorResponse> {
        let root = inner_xml(raw, "Integrador").ok_or_else(|| {
            IntegradorError::MalformedResponse("missing Integrador root element".to_string())
        })?;
        let identifier = element_text(root, &["Identificador", "Valor"]).ok_or_else(|| {
            IntegradorError::MalformedResponse("missing Identificador/Valor".to_string())
        })?;

        let answer = inner_xml(root, "IntegradorResposta");
        let non_empty = |value: String| (!value.is_empty()).then_some(value);
        Ok(IntegradorResponse {
            identifier,
            code: answer
                .and_then(|answer| element_text(answer, &["Codigo"]))
                .and_then(non_empty),
            value: answer
                .and_then(|answer| element_text(answer, &["Valor"]))
                .and_then(non_empty),
            payload: inner_xml(root, "Resposta")
                .map(|payload| payload.trim().to_string())
                .and_then(non_empty),
            error: element_text(root, &["Erro"]).and_then(non_empty),
            raw: raw.to_string(),
        })
    }
}
