//! Pure planning for the booking-payment transfer.
//!
//! The orchestration is split in two: this module validates one transfer
//! against a snapshot of the records it touches and computes every resulting
//! value, while the store backends load that snapshot, call
//! [`plan_transfer`] and apply the plan inside a single atomic unit. All
//! intermediate amounts are threaded through the plan by value; there is no
//! shared running total anywhere.

use rust_decimal::Decimal;

use super::error::LedgerError;
use super::models::{Account, Booking, Property};

/// Snapshot of the records a booking payment touches, loaded (and locked)
/// by the store before planning.
#[derive(Debug)]
pub struct TransferInputs<'a> {
    pub from: &'a Account,
    pub to: &'a Account,
    /// Platform account that collects the service fee. Only required when
    /// the authorized amount exceeds the booking price.
    pub platform: Option<&'a Account>,
    pub booking: &'a Booking,
    pub property: &'a Property,
    /// Amount the caller authorized; must cover at least the booking price.
    pub amount: Decimal,
}

/// Everything a successful transfer writes back, precomputed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferPlan {
    /// Booking price actually moved from payer to payee.
    pub price: Decimal,
    /// `amount - price`, routed to the platform account when positive.
    pub service_fee: Decimal,
    pub from_balance: Decimal,
    pub from_deposit: Decimal,
    pub to_balance: Decimal,
    /// New platform balance; `None` when no fee was charged.
    pub platform_balance: Option<Decimal>,
    /// Amount added to the `(from, booking)` frozen deposit. Equals `price`.
    pub escrow_increment: Decimal,
    /// Remaining units on the property after this booking.
    pub property_quantity: i32,
}

/// Validate one booking payment and compute its complete write set.
///
/// Checks run in the same order the persisted unit applies its writes, so a
/// failure here is exactly the failure the caller would have observed
/// mid-sequence, with no state touched:
///
/// 1. amount positive, payer != payee
/// 2. amount covers the booking price
/// 3. payer balance covers the price
/// 4. property has inventory left
/// 5. post-price balance covers the service fee, fee routed to platform
/// 6. payer deposit pool covers the price (frozen into escrow)
///
/// Step 6 charges the deposit pool for the same price already taken from
/// the balance in step 3. That mirrors the reference ledger as deployed;
/// see DESIGN.md before "fixing" it.
pub fn plan_transfer(inp: &TransferInputs<'_>) -> Result<TransferPlan, LedgerError> {
    if inp.amount <= Decimal::ZERO {
        return Err(LedgerError::invalid("amount must be positive"));
    }
    if inp.from.account_no == inp.to.account_no {
        return Err(LedgerError::invalid(
            "source and destination accounts are the same",
        ));
    }

    let price = inp.booking.total_price;
    if price <= Decimal::ZERO {
        return Err(LedgerError::invalid("booking has a non-positive price"));
    }
    if inp.amount < price {
        return Err(LedgerError::invalid(
            "authorized amount is below the booking price",
        ));
    }

    if inp.from.balance < price {
        return Err(LedgerError::InsufficientFunds("balance"));
    }
    let mut from_balance = inp.from.balance - price;
    let to_balance = inp.to.balance + price;

    if inp.property.quantity <= 0 {
        return Err(LedgerError::InventoryExhausted);
    }
    let property_quantity = inp.property.quantity - 1;

    let service_fee = inp.amount - price;
    let platform_balance = if service_fee > Decimal::ZERO {
        let platform = inp
            .platform
            .ok_or_else(|| LedgerError::AccountNotFound("platform".to_string()))?;
        if platform.account_no == inp.from.account_no
            || platform.account_no == inp.to.account_no
        {
            return Err(LedgerError::invalid(
                "platform account cannot take part in the transfer",
            ));
        }
        if from_balance < service_fee {
            return Err(LedgerError::InsufficientFunds("balance"));
        }
        from_balance -= service_fee;
        Some(platform.balance + service_fee)
    } else {
        None
    };

    if inp.from.deposit < price {
        return Err(LedgerError::InsufficientFunds("deposit"));
    }
    let from_deposit = inp.from.deposit - price;

    Ok(TransferPlan {
        price,
        service_fee,
        from_balance,
        from_deposit,
        to_balance,
        platform_balance,
        escrow_increment: price,
        property_quantity,
    })
}
