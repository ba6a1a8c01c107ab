use chrono::NaiveDate;
use rand::{distributions::Alphanumeric, Rng};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::{entities::rental, errors::ServiceError};

/// Late-return penalty: 150% of the daily price per day of delay.
const LATE_FEE_MULTIPLIER: Decimal = dec!(1.5);

/// All amounts needed to persist an invoice, computed but not yet stored.
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceDraft {
    pub invoice_number: String,
    pub issue_date: NaiveDate,
    pub planned_days: i64,
    pub base_amount: Decimal,
    pub late_fee: Decimal,
    pub late_fee_description: Option<String>,
    pub total_amount: Decimal,
}

/// Computes the invoice for a rental, deterministically for a fixed
/// evaluation date (`today`) apart from the random invoice-number suffix.
///
/// Day counting is inclusive: both the start and the planned end day are
/// billed. Lateness is measured against the evaluation time, not the end
/// date, and excludes the end day itself.
pub fn compute_invoice(
    rental: &rental::Model,
    daily_price: Decimal,
    today: NaiveDate,
) -> Result<InvoiceDraft, ServiceError> {
    if rental.end_date < rental.start_date {
        return Err(ServiceError::Conflict(
            "Rental end date cannot be before its start date".to_string(),
        ));
    }

    let planned_days = (rental.end_date - rental.start_date).num_days() + 1;
    let base_amount = daily_price * Decimal::from(planned_days);

    let (late_fee, late_fee_description) = if today > rental.end_date {
        let late_days = (today - rental.end_date).num_days();
        let daily_late_fee = daily_price * LATE_FEE_MULTIPLIER;
        let late_fee = daily_late_fee * Decimal::from(late_days);
        let description = format!(
            "{} day(s) late return ({} per day)",
            late_days, daily_late_fee
        );
        (late_fee, Some(description))
    } else {
        (Decimal::ZERO, None)
    };

    let total_amount = base_amount + late_fee;

    Ok(InvoiceDraft {
        invoice_number: generate_invoice_number(today),
        issue_date: today,
        planned_days,
        base_amount,
        late_fee,
        late_fee_description,
        total_amount,
    })
}

/// `INV-YYYYMMDD-XXXXXXXX`: date-stamped prefix plus an unpredictable
/// 8-character suffix. Collisions are not prevented here; the unique index
/// on `invoices.invoice_number` is the backstop.
pub fn generate_invoice_number(today: NaiveDate) -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(8)
        .map(|c| (c as char).to_ascii_uppercase())
        .collect();
    format!("INV-{}-{}", today.format("%Y%m%d"), suffix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn rental(start: (i32, u32, u32), end: (i32, u32, u32)) -> rental::Model {
        rental::Model {
            id: Uuid::new_v4(),
            vehicle_id: Uuid::new_v4(),
            customer_name: "Jane Doe".into(),
            customer_national_id: "12345678901".into(),
            customer_phone: "5551234567".into(),
            start_date: NaiveDate::from_ymd_opt(start.0, start.1, start.2).unwrap(),
            end_date: NaiveDate::from_ymd_opt(end.0, end.1, end.2).unwrap(),
            return_date: None,
            active: true,
            created_at: Utc::now(),
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_on_time_return_has_no_late_fee() {
        // dailyPrice=100, 2024-01-01..2024-01-05 evaluated on the end date
        let draft = compute_invoice(
            &rental((2024, 1, 1), (2024, 1, 5)),
            dec!(100),
            date(2024, 1, 5),
        )
        .unwrap();

        assert_eq!(draft.planned_days, 5);
        assert_eq!(draft.base_amount, dec!(500));
        assert_eq!(draft.late_fee, Decimal::ZERO);
        assert!(draft.late_fee_description.is_none());
        assert_eq!(draft.total_amount, dec!(500));
    }

    #[test]
    fn test_three_days_late_charges_per_day_penalty() {
        // Same rental evaluated on 2024-01-08: 3 late days at 150/day
        let draft = compute_invoice(
            &rental((2024, 1, 1), (2024, 1, 5)),
            dec!(100),
            date(2024, 1, 8),
        )
        .unwrap();

        assert_eq!(draft.base_amount, dec!(500));
        assert_eq!(draft.late_fee, dec!(450));
        assert_eq!(draft.total_amount, dec!(950));
        let desc = draft.late_fee_description.unwrap();
        assert!(desc.contains('3'));
        assert!(desc.contains("150"));
    }

    #[test]
    fn test_early_return_still_bills_planned_days() {
        let draft = compute_invoice(
            &rental((2024, 1, 1), (2024, 1, 5)),
            dec!(100),
            date(2024, 1, 3),
        )
        .unwrap();

        assert_eq!(draft.base_amount, dec!(500));
        assert_eq!(draft.late_fee, Decimal::ZERO);
    }

    #[test]
    fn test_single_day_rental() {
        let draft = compute_invoice(
            &rental((2024, 1, 1), (2024, 1, 1)),
            dec!(80),
            date(2024, 1, 1),
        )
        .unwrap();

        assert_eq!(draft.planned_days, 1);
        assert_eq!(draft.total_amount, dec!(80));
    }

    #[test]
    fn test_end_before_start_is_rejected() {
        let result = compute_invoice(
            &rental((2024, 1, 5), (2024, 1, 1)),
            dec!(100),
            date(2024, 1, 6),
        );
        assert!(matches!(result, Err(ServiceError::Conflict(_))));
    }

    #[test]
    fn test_invoice_number_format() {
        let number = generate_invoice_number(date(2024, 3, 7));
        assert!(number.starts_with("INV-20240307-"));
        let suffix = number.rsplit('-').next().unwrap();
        assert_eq!(suffix.len(), 8);
        assert!(suffix
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
    }

    #[test]
    fn test_invoice_numbers_differ() {
        let today = date(2024, 3, 7);
        assert_ne!(generate_invoice_number(today), generate_invoice_number(today));
    }

    #[test]
    fn test_fractional_daily_price() {
        let draft = compute_invoice(
            &rental((2024, 1, 1), (2024, 1, 2)),
            dec!(99.50),
            date(2024, 1, 4),
        )
        .unwrap();

        assert_eq!(draft.base_amount, dec!(199.00));
        // 2 late days at 149.25/day
        assert_eq!(draft.late_fee, dec!(298.50));
        assert_eq!(draft.total_amount, dec!(497.50));
    }
}
