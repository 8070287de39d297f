// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::CrmError;
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Closed set of lowercase tokens stored verbatim in TEXT columns.
macro_rules! text_enum {
    ($(#[$meta:meta])* $name:ident, $kind:literal { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $text)] $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = CrmError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let norm = s.trim().replace('-', "_");
                $(
                    if norm.eq_ignore_ascii_case($text) {
                        return Ok($name::$variant);
                    }
                )+
                Err(CrmError::UnknownVariant {
                    kind: $kind,
                    value: s.trim().to_string(),
                })
            }
        }
    };
}

text_enum!(Currency, "currency" {
    Chf => "CHF",
    Eur => "EUR",
    Usd => "USD",
});

text_enum!(
    /// How a recurring amount repeats.
    Frequency, "frequency" {
        OneTime => "one_time",
        Monthly => "monthly",
        Annual => "annual",
    }
);

text_enum!(
    /// Payment status for expenses and income.
    RecordStatus, "record status" {
        Paid => "paid",
        Pending => "pending",
        Upcoming => "upcoming",
    }
);

text_enum!(MilestoneStatus, "milestone status" {
    Pending => "pending",
    Partial => "partial",
    Paid => "paid",
});

text_enum!(InvoiceStatus, "invoice status" {
    Pending => "pending",
    Paid => "paid",
    Overdue => "overdue",
    Cancelled => "cancelled",
});

text_enum!(ActivityStatus, "activity status" {
    Pending => "pending",
    Completed => "completed",
    Cancelled => "cancelled",
    Overdue => "overdue",
    Rescheduled => "rescheduled",
});

text_enum!(ActivityKind, "activity kind" {
    Call => "call",
    Email => "email",
    Meeting => "meeting",
    Task => "task",
    FollowUp => "follow_up",
});

text_enum!(
    /// Pipeline stage of a lead.
    LeadStatus, "lead status" {
        New => "new",
        Contacted => "contacted",
        Qualified => "qualified",
        Proposal => "proposal",
        Negotiation => "negotiation",
        Won => "won",
        Lost => "lost",
    }
);

text_enum!(LeadEventKind, "lead event kind" {
    Call => "call",
    Email => "email",
    Meeting => "meeting",
    Note => "note",
    StatusChange => "status_change",
});

text_enum!(ProjectStatus, "project status" {
    Planned => "planned",
    Active => "active",
    OnHold => "on_hold",
    Completed => "completed",
    Cancelled => "cancelled",
});

text_enum!(PaymentType, "payment type" {
    OneTime => "one_time",
    Monthly => "monthly",
    Annual => "annual",
    Milestone => "milestone",
});

impl LeadStatus {
    pub fn is_closed(&self) -> bool {
        matches!(self, LeadStatus::Won | LeadStatus::Lost)
    }
}

impl PaymentType {
    /// Frequency of the income a completed project posts; milestone projects post none.
    pub fn frequency(&self) -> Option<Frequency> {
        match self {
            PaymentType::OneTime => Some(Frequency::OneTime),
            PaymentType::Monthly => Some(Frequency::Monthly),
            PaymentType::Annual => Some(Frequency::Annual),
            PaymentType::Milestone => None,
        }
    }
}

impl From<ActivityKind> for LeadEventKind {
    fn from(kind: ActivityKind) -> Self {
        match kind {
            ActivityKind::Call => LeadEventKind::Call,
            ActivityKind::Email => LeadEventKind::Email,
            ActivityKind::Meeting => LeadEventKind::Meeting,
            ActivityKind::Task | ActivityKind::FollowUp => LeadEventKind::Note,
        }
    }
}

/// Ownership of a recurring record and the table it lives in.
pub trait OwnerKind: Clone + fmt::Debug + Serialize {
    const TABLE: &'static str;
    const LABEL: &'static str;
    /// Whether the table carries `client_id` / `project_id` columns.
    const CLIENT_SCOPED: bool;

    fn from_keys(client_id: Option<i64>, project_id: Option<i64>) -> Option<Self>;
    fn client_id(&self) -> Option<i64>;
    fn project_id(&self) -> Option<i64>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Company;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ClientCost {
    pub client_id: i64,
    pub project_id: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ClientRevenue {
    pub client_id: i64,
    pub project_id: Option<i64>,
}

impl OwnerKind for Company {
    const TABLE: &'static str = "company_expenses";
    const LABEL: &'static str = "company expense";
    const CLIENT_SCOPED: bool = false;

    fn from_keys(_client_id: Option<i64>, _project_id: Option<i64>) -> Option<Self> {
        Some(Company)
    }
    fn client_id(&self) -> Option<i64> {
        None
    }
    fn project_id(&self) -> Option<i64> {
        None
    }
}

impl OwnerKind for ClientCost {
    const TABLE: &'static str = "client_expenses";
    const LABEL: &'static str = "client expense";
    const CLIENT_SCOPED: bool = true;

    fn from_keys(client_id: Option<i64>, project_id: Option<i64>) -> Option<Self> {
        client_id.map(|client_id| ClientCost {
            client_id,
            project_id,
        })
    }
    fn client_id(&self) -> Option<i64> {
        Some(self.client_id)
    }
    fn project_id(&self) -> Option<i64> {
        self.project_id
    }
}

impl OwnerKind for ClientRevenue {
    const TABLE: &'static str = "client_income";
    const LABEL: &'static str = "client income";
    const CLIENT_SCOPED: bool = true;

    fn from_keys(client_id: Option<i64>, project_id: Option<i64>) -> Option<Self> {
        client_id.map(|client_id| ClientRevenue {
            client_id,
            project_id,
        })
    }
    fn client_id(&self) -> Option<i64> {
        Some(self.client_id)
    }
    fn project_id(&self) -> Option<i64> {
        self.project_id
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RecurringRecord<K> {
    pub id: i64,
    pub name: String,
    pub category: Option<String>,
    pub amount: Decimal,
    pub currency: Currency,
    pub frequency: Frequency,
    pub status: RecordStatus,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub payment_date: Option<NaiveDate>,
    pub renewal_date: Option<NaiveDate>,
    #[serde(flatten)]
    pub owner: K,
    pub notes: Option<String>,
    pub user_id: Option<String>,
}

impl<K: OwnerKind> RecurringRecord<K> {
    pub fn new(name: impl Into<String>, amount: Decimal, frequency: Frequency, owner: K) -> Self {
        RecurringRecord {
            id: 0,
            name: name.into(),
            category: None,
            amount,
            currency: Currency::Chf,
            frequency,
            status: RecordStatus::Pending,
            start_date: None,
            end_date: None,
            payment_date: None,
            renewal_date: None,
            owner,
            notes: None,
            user_id: None,
        }
    }

    /// Date used to bucket one-time charges into a calendar month.
    pub fn own_date(&self) -> Option<NaiveDate> {
        self.payment_date.or(self.start_date)
    }
}

pub type CompanyExpense = RecurringRecord<Company>;
pub type ClientExpense = RecurringRecord<ClientCost>;
pub type ClientIncome = RecurringRecord<ClientRevenue>;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Client {
    pub id: i64,
    pub name: String,
    pub company: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub notes: Option<String>,
    pub contact_count: i64,
    pub last_contact_date: Option<NaiveDate>,
    pub lead_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lead {
    pub id: i64,
    pub name: String,
    pub company: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub source: Option<String>,
    pub status: LeadStatus,
    pub value: Option<Decimal>,
    pub currency: Currency,
    pub contact_count: i64,
    pub last_contact_date: Option<NaiveDate>,
    pub next_follow_up: Option<NaiveDate>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeadActivity {
    pub id: i64,
    pub lead_id: i64,
    pub kind: LeadEventKind,
    pub description: String,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Activity {
    pub id: i64,
    pub title: String,
    pub kind: ActivityKind,
    pub lead_id: Option<i64>,
    pub client_id: Option<i64>,
    pub scheduled_date: NaiveDate,
    pub status: ActivityStatus,
    pub completed_at: Option<NaiveDateTime>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: i64,
    pub client_id: i64,
    pub name: String,
    pub status: ProjectStatus,
    pub total_amount: Decimal,
    pub currency: Currency,
    pub payment_type: Option<PaymentType>,
    /// Only meaningful when `payment_type` is not `milestone`.
    pub paid_amount: Decimal,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectMilestone {
    pub id: i64,
    pub project_id: i64,
    pub name: String,
    pub amount: Decimal,
    pub due_date: Option<NaiveDate>,
    pub status: MilestoneStatus,
    pub paid_amount: Decimal,
    pub paid_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    pub id: i64,
    pub client_id: i64,
    pub project_id: Option<i64>,
    pub number: String,
    pub amount: Decimal,
    pub currency: Currency,
    pub status: InvoiceStatus,
    pub issue_date: NaiveDate,
    pub due_date: Option<NaiveDate>,
    pub paid_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attachment {
    pub id: i64,
    pub entity: String,
    pub entity_id: i64,
    pub path: String,
    pub file_name: String,
}
