//! Chart of accounts domain types.

use chrono::{DateTime, Utc};
use coopledger_shared::types::{AccountId, BranchId, CurrencyId, OrganizationId, UserId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ledger::GeneralLedgerSource;

/// Rank given to accounts without a recognised general-ledger type.
pub const UNCLASSIFIED_RANK: u16 = 999;

/// General-ledger classification of an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GeneralLedgerType {
    /// Resources owned (debit-normal).
    Assets,
    /// Obligations owed (credit-normal).
    Liabilities,
    /// Members' equity (credit-normal).
    Equity,
    /// Income (credit-normal).
    Revenue,
    /// Costs (debit-normal).
    Expenses,
}

impl GeneralLedgerType {
    /// All types in chart order.
    pub const ALL: [Self; 5] = [
        Self::Assets,
        Self::Liabilities,
        Self::Equity,
        Self::Revenue,
        Self::Expenses,
    ];

    /// Position of this group in the chart of accounts.
    #[must_use]
    pub const fn rank(self) -> u16 {
        match self {
            Self::Assets => 1,
            Self::Liabilities => 2,
            Self::Equity => 3,
            Self::Revenue => 4,
            Self::Expenses => 5,
        }
    }

    /// Returns true when debits increase the balance.
    #[must_use]
    pub const fn is_debit_normal(self) -> bool {
        matches!(self, Self::Assets | Self::Expenses)
    }

    /// Stored representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Assets => "Assets",
            Self::Liabilities => "Liabilities",
            Self::Equity => "Equity",
            Self::Revenue => "Revenue",
            Self::Expenses => "Expenses",
        }
    }
}

/// Rank of an optional classification; unknown groups sort last.
#[must_use]
pub const fn group_rank(general_ledger_type: Option<GeneralLedgerType>) -> u16 {
    match general_ledger_type {
        Some(gl) => gl.rank(),
        None => UNCLASSIFIED_RANK,
    }
}

impl std::fmt::Display for GeneralLedgerType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for GeneralLedgerType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Assets" => Ok(Self::Assets),
            "Liabilities" => Ok(Self::Liabilities),
            "Equity" => Ok(Self::Equity),
            "Revenue" => Ok(Self::Revenue),
            "Expenses" => Ok(Self::Expenses),
            _ => Err(format!("Unknown general ledger type: {s}")),
        }
    }
}

/// Product classification of an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccountType {
    /// Savings deposit.
    Deposit,
    /// Loan receivable.
    Loan,
    /// Accounts receivable ledger.
    ArLedger,
    /// Accounts receivable aging.
    ArAging,
    /// Penalty fines.
    Fines,
    /// Interest income.
    Interest,
    /// Service fee ledger.
    SvfLedger,
    /// Written-off receivables.
    WriteOff,
    /// Accounts payable ledger.
    ApLedger,
    /// Institutional account without member sub-ledgers.
    Other,
    /// Time deposit.
    TimeDeposit,
}

impl AccountType {
    /// Returns true when postings are tracked per member.
    #[must_use]
    pub const fn has_member_sub_ledger(self) -> bool {
        !matches!(self, Self::Other)
    }

    /// Stored representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Deposit => "Deposit",
            Self::Loan => "Loan",
            Self::ArLedger => "A/R-Ledger",
            Self::ArAging => "A/R-Aging",
            Self::Fines => "Fines",
            Self::Interest => "Interest",
            Self::SvfLedger => "SVF-Ledger",
            Self::WriteOff => "W-Off",
            Self::ApLedger => "A/P-Ledger",
            Self::Other => "Other",
            Self::TimeDeposit => "Time Deposit",
        }
    }
}

impl std::fmt::Display for AccountType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AccountType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Deposit" => Ok(Self::Deposit),
            "Loan" => Ok(Self::Loan),
            "A/R-Ledger" => Ok(Self::ArLedger),
            "A/R-Aging" => Ok(Self::ArAging),
            "Fines" => Ok(Self::Fines),
            "Interest" => Ok(Self::Interest),
            "SVF-Ledger" => Ok(Self::SvfLedger),
            "W-Off" => Ok(Self::WriteOff),
            "A/P-Ledger" => Ok(Self::ApLedger),
            "Other" => Ok(Self::Other),
            "Time Deposit" => Ok(Self::TimeDeposit),
            _ => Err(format!("Unknown account type: {s}")),
        }
    }
}

/// How interest is computed over the life of a loan product.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComputationType {
    /// Flat interest on the original principal.
    #[default]
    Straight,
    /// Interest on the outstanding principal.
    Diminishing,
    /// Diminishing interest spread evenly across terms.
    DiminishingStraight,
}

/// Lump-sum computation applied at maturity or release.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LumpsumComputationType {
    /// No lump-sum computation.
    #[default]
    None,
    /// Compute fines at maturity.
    ComputeFinesMaturity,
    /// Compute interest at maturity or over terms.
    ComputeInterestMaturity,
    /// Deduct interest in advance.
    ComputeAdvanceInterest,
}

/// Period the standard interest rate is expressed in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum InterestStandardComputation {
    /// No standard interest.
    #[default]
    None,
    /// Rate per year.
    Yearly,
    /// Rate per month.
    Monthly,
}

impl ComputationType {
    /// Stored representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Straight => "Straight",
            Self::Diminishing => "Diminishing",
            Self::DiminishingStraight => "DiminishingStraight",
        }
    }
}

impl std::str::FromStr for ComputationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Straight" => Ok(Self::Straight),
            "Diminishing" => Ok(Self::Diminishing),
            "DiminishingStraight" => Ok(Self::DiminishingStraight),
            _ => Err(format!("Unknown computation type: {s}")),
        }
    }
}

impl LumpsumComputationType {
    /// Stored representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "None",
            Self::ComputeFinesMaturity => "ComputeFinesMaturity",
            Self::ComputeInterestMaturity => "ComputeInterestMaturity",
            Self::ComputeAdvanceInterest => "ComputeAdvanceInterest",
        }
    }
}

impl std::str::FromStr for LumpsumComputationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "None" => Ok(Self::None),
            "ComputeFinesMaturity" => Ok(Self::ComputeFinesMaturity),
            "ComputeInterestMaturity" => Ok(Self::ComputeInterestMaturity),
            "ComputeAdvanceInterest" => Ok(Self::ComputeAdvanceInterest),
            _ => Err(format!("Unknown lumpsum computation type: {s}")),
        }
    }
}

impl InterestStandardComputation {
    /// Stored representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Yearly => "Yearly",
            Self::Monthly => "Monthly",
        }
    }
}

impl std::str::FromStr for InterestStandardComputation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "None" => Ok(Self::None),
            "Yearly" => Ok(Self::Yearly),
            "Monthly" => Ok(Self::Monthly),
            _ => Err(format!("Unknown interest standard computation: {s}")),
        }
    }
}

/// Product computation terms carried on an account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComputationTerms {
    /// Interest computation method.
    pub computation_type: ComputationType,
    /// Lump-sum computation.
    pub lumpsum_computation_type: LumpsumComputationType,
    /// Period of the standard interest rate.
    pub interest_standard_computation: InterestStandardComputation,
    /// Standard interest rate.
    pub interest_standard: Decimal,
    /// Interest rate for secured loans.
    pub interest_secured: Decimal,
    /// Fines rate on late amortization.
    pub fines_amort: Decimal,
    /// Fines rate after maturity.
    pub fines_maturity: Decimal,
    /// Grace days before amortization fines apply.
    pub fines_grace_period_amortization: i32,
    /// Grace days before maturity fines apply.
    pub fines_grace_period_maturity: i32,
    /// Extra grace days granted on top of the above.
    pub additional_grace_period: i32,
    /// Fines accrue from day one on daily schedules.
    pub no_grace_period_daily: bool,
    /// Yearly subscription fee.
    pub yearly_subscription_fee: Decimal,
    /// Cut-off days for interest computation.
    pub cut_off_days: i32,
    /// Cut-off months for interest computation.
    pub cut_off_months: i32,
    /// Whether a compassion fund contribution is collected.
    pub compassion_fund: bool,
    /// Compassion fund contribution amount.
    pub compassion_fund_amount: Decimal,
}

/// Teller screens an account may be posted from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct PostingSources {
    /// Withdrawals.
    pub withdraw: bool,
    /// Deposits.
    pub deposit: bool,
    /// Journal entries.
    pub journal: bool,
    /// Payments.
    pub payment: bool,
    /// Adjustment entries.
    pub adjustment: bool,
    /// Journal vouchers.
    pub journal_voucher: bool,
    /// Check vouchers.
    pub check_voucher: bool,
}

impl PostingSources {
    /// Every screen enabled.
    #[must_use]
    pub const fn all() -> Self {
        Self {
            withdraw: true,
            deposit: true,
            journal: true,
            payment: true,
            adjustment: true,
            journal_voucher: true,
            check_voucher: true,
        }
    }

    /// Returns true if entries from `source` are offered for this account.
    ///
    /// Sources without a dedicated screen (loan releases, interest runs and
    /// the like) are always allowed.
    #[must_use]
    pub const fn allows(&self, source: GeneralLedgerSource) -> bool {
        match source {
            GeneralLedgerSource::Withdraw => self.withdraw,
            GeneralLedgerSource::Deposit => self.deposit,
            GeneralLedgerSource::Journal => self.journal,
            GeneralLedgerSource::Payment => self.payment,
            GeneralLedgerSource::Adjustment => self.adjustment,
            GeneralLedgerSource::JournalVoucher => self.journal_voucher,
            GeneralLedgerSource::CheckVoucher => self.check_voucher,
            _ => true,
        }
    }
}

/// Everything about an account that is captured in a history snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct AccountAttributes {
    /// Display name, unique per branch by convention.
    pub name: String,
    /// Free-form description.
    pub description: String,
    /// Product classification.
    pub account_type: AccountType,
    /// General-ledger classification; `None` when unclassified.
    pub general_ledger_type: Option<GeneralLedgerType>,
    /// Fractional sort key within the general-ledger group.
    pub index: Decimal,
    /// Minimum (maintaining) balance.
    pub min_amount: Decimal,
    /// Maximum amount per posting.
    pub max_amount: Decimal,
    /// Product computation terms.
    pub terms: ComputationTerms,
    /// Screens the account is offered on.
    pub posting_sources: PostingSources,
    /// Institutional account hidden from members.
    pub is_internal: bool,
    /// Branch cash-on-hand account.
    pub cash_on_hand: bool,
    /// Paid-up share capital account.
    pub paid_up_share_capital: bool,
    /// Counts toward cash and cash equivalents.
    pub cash_and_cash_equivalence: bool,
    /// Currency the account is kept in.
    pub currency_id: Option<CurrencyId>,
    /// Parent loan account this account is linked to.
    pub loan_account_id: Option<AccountId>,
}

impl AccountAttributes {
    /// Creates attributes with defaults for everything except the name and classification.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        account_type: AccountType,
        general_ledger_type: Option<GeneralLedgerType>,
    ) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            account_type,
            general_ledger_type,
            index: Decimal::ZERO,
            min_amount: Decimal::ZERO,
            max_amount: Decimal::ZERO,
            terms: ComputationTerms::default(),
            posting_sources: PostingSources::all(),
            is_internal: false,
            cash_on_hand: false,
            paid_up_share_capital: false,
            cash_and_cash_equivalence: false,
            currency_id: None,
            loan_account_id: None,
        }
    }
}

/// A chart of accounts entry owned by one branch of one organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Account id.
    pub id: AccountId,
    /// Owning organization.
    pub organization_id: OrganizationId,
    /// Owning branch.
    pub branch_id: BranchId,
    /// Snapshot-able attributes.
    pub attributes: AccountAttributes,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Creator.
    pub created_by: UserId,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
    /// Last modifier.
    pub updated_by: UserId,
}

impl Account {
    /// Creates a new account stamped with `actor` and `now`.
    #[must_use]
    pub fn new(
        organization_id: OrganizationId,
        branch_id: BranchId,
        attributes: AccountAttributes,
        actor: UserId,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: AccountId::new(),
            organization_id,
            branch_id,
            attributes,
            created_at: now,
            created_by: actor,
            updated_at: now,
            updated_by: actor,
        }
    }

    /// Returns true if the account belongs to the given organization and branch.
    #[must_use]
    pub fn is_in_scope(&self, organization_id: OrganizationId, branch_id: BranchId) -> bool {
        self.organization_id == organization_id && self.branch_id == branch_id
    }

    /// Chart group rank of this account.
    #[must_use]
    pub const fn rank(&self) -> u16 {
        group_rank(self.attributes.general_ledger_type)
    }
}
