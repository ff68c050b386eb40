use serde::{Deserialize, Serialize};

/// Risk tier assigned to a late invoice. Serialized with the capitalized
/// names downstream dashboards already key on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskTier {
    Low,
    Medium,
    High,
}

impl RiskTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskTier::Low => "Low",
            RiskTier::Medium => "Medium",
            RiskTier::High => "High",
        }
    }
}

/// One raw process-step event as consumed from the procurement stream.
///
/// Only the invoice subset drives classification. The rest is carried so
/// the document appended to the raw index is the event as consumed; fields
/// this processor does not model survive through `extra`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawEvent {
    #[serde(rename = "Req_Line_ID")]
    pub req_line_id: Option<String>,
    #[serde(rename = "Order_Line_ID")]
    pub order_line_id: Option<String>,
    #[serde(rename = "Goods_ID")]
    pub goods_id: Option<String>,
    #[serde(rename = "Invoice_ID")]
    pub invoice_id: Option<String>,
    #[serde(rename = "Activity")]
    pub activity: Option<String>,
    #[serde(rename = "DateTime")]
    pub datetime: Option<String>,
    #[serde(rename = "Resource")]
    pub resource: Option<String>,
    #[serde(rename = "Role")]
    pub role: Option<String>,
    #[serde(rename = "Requisition_Vendor")]
    pub requisition_vendor: Option<String>,
    #[serde(rename = "Order_Vendor")]
    pub order_vendor: Option<String>,
    #[serde(rename = "Invoice_Vendor")]
    pub invoice_vendor: Option<String>,
    #[serde(rename = "Pay_Vendor")]
    pub pay_vendor: Option<String>,
    #[serde(rename = "Requisition_Type")]
    pub requisition_type: Option<String>,
    #[serde(rename = "Order_Type")]
    pub order_type: Option<String>,
    #[serde(rename = "Purchasing_Group")]
    pub purchasing_group: Option<String>,
    #[serde(rename = "Purchasing_Organization")]
    pub purchasing_organization: Option<String>,
    #[serde(rename = "Material_Group")]
    pub material_group: Option<String>,
    #[serde(rename = "Material_Number")]
    pub material_number: Option<String>,
    #[serde(rename = "Plant")]
    pub plant: Option<String>,
    #[serde(rename = "Good_ReferenceNumber")]
    pub good_reference_number: Option<String>,
    #[serde(rename = "Requisition_Header")]
    pub requisition_header: Option<String>,
    #[serde(rename = "Order_Header")]
    pub order_header: Option<String>,
    #[serde(rename = "Invoice_Header")]
    pub invoice_header: Option<String>,
    #[serde(rename = "ClearDoc_Header")]
    pub clear_doc_header: Option<String>,
    #[serde(rename = "Good_Year")]
    pub good_year: Option<String>,
    #[serde(rename = "Invoice_Year")]
    pub invoice_year: Option<String>,
    #[serde(rename = "Order_Line_Amount")]
    pub order_line_amount: Option<String>,
    #[serde(rename = "Invoice_Amount")]
    pub invoice_amount: f64,
    #[serde(rename = "Paid_Amount")]
    pub paid_amount: Option<String>,
    #[serde(rename = "Invoice_Document_Date")]
    pub invoice_document_date: Option<String>,
    #[serde(rename = "Invoice_Due_Date")]
    pub invoice_due_date: Option<String>,
    #[serde(rename = "Pay_Type")]
    pub pay_type: Option<String>,
    #[serde(rename = "Pay_Delay")]
    pub pay_delay: i64,
    #[serde(rename = "UserType")]
    pub user_type: Option<String>,
    #[serde(rename = "Invoice_Is_Overdue")]
    pub invoice_is_overdue: Option<String>,
    /// Anything the upstream process model adds that this processor does
    /// not interpret.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// The classified view of an invoice event, published to the risk topic and
/// the risk index once a tier has been assigned.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InvoiceRecord {
    #[serde(rename = "Invoice_ID")]
    pub invoice_id: String,
    #[serde(rename = "Invoice_Amount")]
    pub amount: f64,
    #[serde(rename = "Invoice_Due_Date")]
    pub due_date: String,
    #[serde(rename = "Pay_Type")]
    pub pay_type: String,
    #[serde(rename = "Pay_Delay")]
    pub pay_delay: i64,
    #[serde(rename = "Risk")]
    pub risk: Option<RiskTier>,
    #[serde(rename = "Model_Name")]
    pub model_name: Option<String>,
}

impl From<&RawEvent> for InvoiceRecord {
    fn from(event: &RawEvent) -> Self {
        InvoiceRecord {
            invoice_id: event.invoice_id.clone().unwrap_or_default(),
            amount: event.invoice_amount,
            due_date: event.invoice_due_date.clone().unwrap_or_default(),
            pay_type: event.pay_type.clone().unwrap_or_default(),
            pay_delay: event.pay_delay,
            risk: None,
            model_name: None,
        }
    }
}

impl InvoiceRecord {
    /// Applies a classification outcome. A record is classified at most
    /// once; nothing downstream ever rewrites the tier.
    pub fn with_classification(mut self, risk: RiskTier, model_name: String) -> Self {
        debug_assert!(self.risk.is_none(), "risk assigned twice");
        self.risk = Some(risk);
        self.model_name = Some(model_name);
        self
    }
}
