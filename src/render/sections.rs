#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    /// Flat map of scalar fields.
    Fields,
    /// Ordered list of line items.
    Items,
    /// Money fields, every one formatted as currency.
    Summary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionSpec {
    pub key: &'static str,
    pub title: &'static str,
    pub icon: &'static str,
    pub accent: &'static str,
    pub kind: SectionKind,
}

/// Known result sections in display order. Adding a section is a new row here.
pub const SECTIONS: &[SectionSpec] = &[
    SectionSpec {
        key: "company_info",
        title: "Company Information",
        icon: "🏢",
        accent: "#2563eb",
        kind: SectionKind::Fields,
    },
    SectionSpec {
        key: "invoice_info",
        title: "Invoice Information",
        icon: "📄",
        accent: "#16a34a",
        kind: SectionKind::Fields,
    },
    SectionSpec {
        key: "billing_info",
        title: "Billing Information",
        icon: "💳",
        accent: "#9333ea",
        kind: SectionKind::Fields,
    },
    SectionSpec {
        key: "shipping_info",
        title: "Shipping Information",
        icon: "📦",
        accent: "#ea580c",
        kind: SectionKind::Fields,
    },
    SectionSpec {
        key: "items",
        title: "Items",
        icon: "📋",
        accent: "#2563eb",
        kind: SectionKind::Items,
    },
    SectionSpec {
        key: "tax_info",
        title: "Tax Information",
        icon: "🧾",
        accent: "#dc2626",
        kind: SectionKind::Fields,
    },
    SectionSpec {
        key: "totals",
        title: "Financial Summary",
        icon: "💰",
        accent: "#16a34a",
        kind: SectionKind::Summary,
    },
    SectionSpec {
        key: "transport_info",
        title: "Transport Information",
        icon: "🚚",
        accent: "#4f46e5",
        kind: SectionKind::Fields,
    },
    SectionSpec {
        key: "bank_info",
        title: "Banking Information",
        icon: "🏦",
        accent: "#ca8a04",
        kind: SectionKind::Fields,
    },
];
