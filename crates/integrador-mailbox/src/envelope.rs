//! Command document sent to the external processor.

use std::fmt::Write as _;

use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::{IntegradorError, IntegradorResult};
use crate::session::SessionId;
use crate::xml_text::escape;

/// Value types accepted as method parameters, rendered in the processor's
/// fixed textual format.
pub trait ParameterValue {
    fn to_parameter_text(&self) -> String;
}

impl ParameterValue for str {
    fn to_parameter_text(&self) -> String {
        self.to_string()
    }
}

impl ParameterValue for String {
    fn to_parameter_text(&self) -> String {
        self.clone()
    }
}

impl<T: ParameterValue + ?Sized> ParameterValue for &T {
    fn to_parameter_text(&self) -> String {
        (**self).to_parameter_text()
    }
}

impl ParameterValue for bool {
    fn to_parameter_text(&self) -> String {
        let literal = if *self { "true" } else { "false" };
        literal.to_string()
    }
}

macro_rules! integer_parameter_value {
    ($($ty:ty),*) => {
        $(impl ParameterValue for $ty {
            fn to_parameter_text(&self) -> String {
                self.to_string()
            }
        })*
    };
}

integer_parameter_value!(i32, i64, u32, u64, usize);

impl ParameterValue for SessionId {
    fn to_parameter_text(&self) -> String {
        self.get().to_string()
    }
}

/// Amounts: two fraction digits with a comma separator.
impl ParameterValue for Decimal {
    fn to_parameter_text(&self) -> String {
        format_decimal(*self)
    }
}

/// Formats an amount as the processor expects (`1234,50`).
///
/// Half-cents round away from zero and a value that rounds to zero is never
/// signed.
pub fn format_decimal(value: Decimal) -> String {
    let mut rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    if rounded.is_zero() {
        rounded.set_sign_positive(true);
    }
    rounded.rescale(2);
    rounded.to_string().replace('.', ",")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub name: String,
    pub value: String,
}

/// Ordered `(name, value)` pairs. Order is positional on the wire and
/// duplicates are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Parameters(Vec<Parameter>);

impl Parameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: impl Into<String>, value: impl ParameterValue) -> &mut Self {
        self.0.push(Parameter {
            name: name.into(),
            value: value.to_parameter_text(),
        });
        self
    }

    /// Builder-style [`Parameters::push`].
    pub fn with(mut self, name: impl Into<String>, value: impl ParameterValue) -> Self {
        self.push(name, value);
        self
    }

    pub fn insert(&mut self, index: usize, name: impl Into<String>, value: impl ParameterValue) {
        let index = index.min(self.0.len());
        self.0.insert(
            index,
            Parameter {
                name: name.into(),
                value: value.to_parameter_text(),
            },
        );
    }

    pub fn iter(&self) -> impl Iterator<Item = &Parameter> {
        self.0.iter()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|parameter| parameter.name == name)
            .map(|parameter| parameter.value.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn write_xml(&self, out: &mut String) {
        out.push_str("<Parametros>");
        for parameter in &self.0 {
            let _ = write!(
                out,
                "<Parametro><Nome>{}</Nome><Valor>{}</Valor></Parametro>",
                escape(&parameter.name),
                escape(&parameter.value)
            );
        }
        out.push_str("</Parametros>");
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Method {
    pub name: String,
    pub parameters: Parameters,
    /// Authentication material passed to the component constructor.
    pub constructor: Option<Parameters>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Component {
    pub name: String,
    pub method: Method,
}

/// Rejects blank component or method names.
pub fn validate_names(component_name: &str, method_name: &str) -> IntegradorResult<()> {
    if component_name.trim().is_empty() {
        return Err(IntegradorError::configuration("component name is not set"));
    }
    if method_name.trim().is_empty() {
        return Err(IntegradorError::configuration("method name is not set"));
    }
    Ok(())
}

/// One command document. Built per call and never mutated once written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub identifier: SessionId,
    pub component: Component,
}

impl Envelope {
    /// Validates names and assembles the document. Runs before any I/O.
    pub fn build(
        session_id: SessionId,
        component_name: &str,
        method_name: &str,
        parameters: Parameters,
        constructor: Option<Parameters>,
    ) -> IntegradorResult<Self> {
        validate_names(component_name, method_name)?;
        Ok(Self {
            identifier: session_id,
            component: Component {
                name: component_name.to_string(),
                method: Method {
                    name: method_name.to_string(),
                    parameters,
                    constructor,
                },
            },
        })
    }

    /// `{MethodName}_{SessionId}`, the stem of every file written for this envelope.
    pub fn file_stem(&self) -> String {
        format!("{}_{}", self.component.method.name, self.identifier)
    }

    pub fn to_xml(&self) -> String {
        let method = &self.component.method;
        let mut out = String::from(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
        out.push_str("<Integrador>");
        let _ = write!(
            out,
            "<Identificador><Valor>{}</Valor></Identificador>",
            self.identifier
        );
        let _ = write!(
            out,
            r#"<Componente Nome="{}"><Metodo Nome="{}">"#,
            escape(&self.component.name),
            escape(&method.name)
        );
        if let Some(constructor) = &method.constructor {
            out.push_str("<Construtor>");
            constructor.write_xml(&mut out);
            out.push_str("</Construtor>");
        }
        method.parameters.write_xml(&mut out);
        out.push_str("</Metodo></Componente></Integrador>");
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml_text::element_text;

    fn amount(text: &str) -> Decimal {
        text.parse().expect("decimal literal")
    }

    #[test]
    fn decimals_use_comma_and_two_digits() {
        assert_eq!(format_decimal(amount("1234.5")), "1234,50");
        assert_eq!(format_decimal(Decimal::ZERO), "0,00");
        assert_eq!(format_decimal(Decimal::new(10, 0)), "10,00");
        assert_eq!(Decimal::new(1025, 2).to_parameter_text(), "10,25");
        assert_eq!(format_decimal(amount("-12.3")), "-12,30");
    }

    #[test]
    fn half_cents_round_away_from_zero() {
        assert_eq!(format_decimal(amount("1.005")), "1,01");
        assert_eq!(format_decimal(amount("2.675")), "2,68");
        assert_eq!(format_decimal(amount("0.125")), "0,13");
        assert_eq!(format_decimal(amount("-0.125")), "-0,13");
        assert_eq!(format_decimal(amount("1.0049")), "1,00");
    }

    #[test]
    fn amounts_that_round_to_zero_are_unsigned() {
        assert_eq!(format_decimal(amount("-0.001")), "0,00");
        assert_eq!(format_decimal(amount("-0.004")), "0,00");
        assert_eq!(format_decimal(amount("-0.005")), "-0,01");
    }

    #[test]
    fn booleans_render_as_literals() {
        assert_eq!(true.to_parameter_text(), "true");
        assert_eq!(false.to_parameter_text(), "false");
    }

    #[test]
    fn parameters_keep_order_and_duplicates() {
        let mut parameters = Parameters::new()
            .with("Cnpj", "1")
            .with("Cnpj", "2")
            .with("Parcelas", 3_i32);
        parameters.insert(0, "numeroSessao", SessionId::new(9));

        let names: Vec<_> = parameters.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["numeroSessao", "Cnpj", "Cnpj", "Parcelas"]);
        assert_eq!(parameters.get("Cnpj"), Some("1"));
    }

    #[test]
    fn empty_names_are_configuration_errors() {
        let error = Envelope::build(SessionId::new(1), "", "m", Parameters::new(), None)
            .expect_err("empty component");
        assert!(matches!(error, IntegradorError::Configuration(_)));

        let error = Envelope::build(SessionId::new(1), "VFP-e", " ", Parameters::new(), None)
            .expect_err("empty method");
        assert!(matches!(error, IntegradorError::Configuration(_)));
    }

    #[test]
    fn renders_processor_document() {
        let envelope = Envelope::build(
            SessionId::new(123),
            "VFP-e",
            "VerificarStatusValidador",
            Parameters::new().with("idFila", 7_i32).with("cnpj", "A&B"),
            Some(Parameters::new().with("chaveAcessoValidador", "key")),
        )
        .expect("envelope");

        assert_eq!(envelope.file_stem(), "VerificarStatusValidador_123");
        let xml = envelope.to_xml();
        assert!(xml.contains("<Identificador><Valor>123</Valor></Identificador>"));
        assert!(xml.contains(r#"<Componente Nome="VFP-e"><Metodo Nome="VerificarStatusValidador">"#));
        assert!(xml.contains(
            "<Construtor><Parametros><Parametro><Nome>chaveAcessoValidador</Nome><Valor>key</Valor></Parametro></Parametros></Construtor>"
        ));
        assert!(xml.contains("<Parametro><Nome>cnpj</Nome><Valor>A&amp;B</Valor></Parametro>"));
        assert_eq!(
            element_text(&xml, &["Integrador", "Identificador", "Valor"]).as_deref(),
            Some("123")
        );
        assert!(xml.contains(&SessionId::new(123).response_marker()));
    }

    #[test]
    fn constructor_is_optional() {
        let envelope = Envelope::build(
            SessionId::new(5),
            "ConsultaNumeroSessao",
            "numeroSessao",
            Parameters::new(),
            None,
        )
        .expect("envelope");
        let xml = envelope.to_xml();
        assert!(!xml.contains("Construtor"));
        assert!(xml.contains("<Parametros></Parametros>"));
    }
}
