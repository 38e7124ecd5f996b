//! Named processor operations. Each one only fills in the parameter list the
//! processor expects and delegates to [`IntegradorClient::send`].

use rust_decimal::Decimal;

use crate::client::{CommandRequest, Exchange, IntegradorClient};
use crate::error::IntegradorResult;
use crate::mailbox::Mailbox;
use crate::response::ResponseParser;

/// Component that handles payment validation.
pub const VFP_COMPONENT: &str = "VFP-e";
pub const SESSION_QUERY_COMPONENT: &str = "ConsultaNumeroSessao";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentRequest {
    pub request_key: String,
    pub establishment: String,
    pub pos_serial: String,
    pub cnpj: String,
    pub icms_base: Decimal,
    pub total_amount: Decimal,
    pub payment_origin: String,
    pub allow_multiple_payments: bool,
    pub anti_fraud: bool,
    pub currency_code: String,
    pub issue_nfce_receipt: bool,
}

impl PaymentRequest {
    /// Request with the processor's defaults: multiple payments on, anti-fraud
    /// off, `BRL`, no NFC-e receipt.
    pub fn new(
        request_key: impl Into<String>,
        establishment: impl Into<String>,
        pos_serial: impl Into<String>,
        cnpj: impl Into<String>,
        icms_base: Decimal,
        total_amount: Decimal,
        payment_origin: impl Into<String>,
    ) -> Self {
        Self {
            request_key: request_key.into(),
            establishment: establishment.into(),
            pos_serial: pos_serial.into(),
            cnpj: cnpj.into(),
            icms_base,
            total_amount,
            payment_origin: payment_origin.into(),
            allow_multiple_payments: true,
            anti_fraud: false,
            currency_code: "BRL".to_string(),
            issue_nfce_receipt: false,
        }
    }

    fn to_command(&self) -> CommandRequest {
        CommandRequest::new(VFP_COMPONENT, "EnviarPagamento")
            .param("ChaveRequisicao", self.request_key.as_str())
            .param("Estabelecimento", self.establishment.as_str())
            .param("SerialPOS", self.pos_serial.as_str())
            .param("Cnpj", self.cnpj.as_str())
            .param("IcmsBase", self.icms_base)
            .param("ValorTotalVenda", self.total_amount)
            .param("HabilitarMultiplosPagamentos", self.allow_multiple_payments)
            .param("HabilitarControleAntiFraude", self.anti_fraud)
            .param("CodigoMoeda", self.currency_code.as_str())
            .param("OrigemPagamento", self.payment_origin.as_str())
            .param("EmitirCupomNFCE", self.issue_nfce_receipt)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentStatusRequest {
    pub authorization_code: String,
    pub bin: String,
    pub card_holder: String,
    pub expiration_date: String,
    pub financial_institution: String,
    pub installments: u32,
    pub payment_code: String,
    pub payment_amount: Decimal,
    pub queue_id: i64,
    pub kind: String,
    pub last_four_digits: u32,
}

impl PaymentStatusRequest {
    fn to_command(&self) -> CommandRequest {
        CommandRequest::new(VFP_COMPONENT, "EnviarStatusPagamento")
            .param("CodigoAutorizacao", self.authorization_code.as_str())
            .param("Bin", self.bin.as_str())
            .param("DonoCartao", self.card_holder.as_str())
            .param("DataExpiracao", self.expiration_date.as_str())
            .param("InstituicaoFinanceira", self.financial_institution.as_str())
            .param("Parcelas", self.installments)
            .param("CodigoPagamento", self.payment_code.as_str())
            .param("ValorPagamento", self.payment_amount)
            .param("IdFila", self.queue_id)
            .param("Tipo", self.kind.as_str())
            .param("UltimosQuatroDigitos", self.last_four_digits)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FiscalResponseRequest {
    pub queue_id: i64,
    pub access_key: String,
    pub nsu: String,
    pub approval_number: String,
    pub card_brand: String,
    pub acquirer: String,
    pub cnpj: String,
    pub fiscal_print: String,
    pub document_number: String,
}

impl FiscalResponseRequest {
    fn to_command(&self) -> CommandRequest {
        CommandRequest::new(VFP_COMPONENT, "RespostaFiscal")
            .param("idFila", self.queue_id)
            .param("ChaveAcesso", self.access_key.as_str())
            .param("Nsu", self.nsu.as_str())
            .param("NumerodeAprovacao", self.approval_number.as_str())
            .param("Bandeira", self.card_brand.as_str())
            .param("Adquirente", self.acquirer.as_str())
            .param("Cnpj", self.cnpj.as_str())
            .param("ImpressaoFiscal", self.fiscal_print.as_str())
            .param("NumeroDocumento", self.document_number.as_str())
    }
}

impl<M: Mailbox, P: ResponseParser> IntegradorClient<M, P> {
    /// Asks the processor about an earlier session.
    pub fn consult_session(&self, session_number: u64) -> IntegradorResult<Exchange<P::Output>> {
        let request = CommandRequest::new(SESSION_QUERY_COMPONENT, "numeroSessao")
            .param("numeroSessao", session_number);
        self.send(&request, false)
    }

    pub fn send_payment(&self, payment: &PaymentRequest) -> IntegradorResult<Exchange<P::Output>> {
        self.send(&payment.to_command(), false)
    }

    pub fn check_validator_status(
        &self,
        queue_id: i64,
        cnpj: &str,
    ) -> IntegradorResult<Exchange<P::Output>> {
        let request = CommandRequest::new(VFP_COMPONENT, "VerificarStatusValidador")
            .param("idFila", queue_id)
            .param("cnpj", cnpj);
        self.send(&request, false)
    }

    pub fn send_payment_status(
        &self,
        status: &PaymentStatusRequest,
    ) -> IntegradorResult<Exchange<P::Output>> {
        self.send(&status.to_command(), false)
    }

    pub fn fiscal_response(
        &self,
        fiscal: &FiscalResponseRequest,
    ) -> IntegradorResult<Exchange<P::Output>> {
        self.send(&fiscal.to_command(), false)
    }
}
