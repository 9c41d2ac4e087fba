use crate::svg_table::{Alignment, Palette, SvgTableBuilder, combine_svgs_vertically};
use std::{borrow::Cow, fmt::Write};
use tripsplit_application::{PersonBalance, SettlementResult, Theme};
use tripsplit_domain::{Money, SettlementTransaction};

pub const NO_DEBTS: &str = "No debts yet. Happy splitting!";

pub struct SettlementPresenter;

#[derive(Debug)]
pub struct SettlementView {
    pub balance_table_svg: String,
    /// `None` when nobody owes anything.
    pub transfer_table_svg: Option<String>,
}

impl SettlementView {
    pub fn tables(&self) -> Vec<&str> {
        std::iter::once(self.balance_table_svg.as_str())
            .chain(self.transfer_table_svg.as_deref())
            .collect()
    }
}

impl SettlementPresenter {
    pub fn render(result: &SettlementResult, theme: Theme) -> SettlementView {
        let palette = Palette::for_theme(theme);
        let balance_table_svg = Self::build_balance_table_svg(&result.balances, palette);
        let transfer_table_svg = (!result.transactions.is_empty())
            .then(|| Self::build_transfer_table_svg(&result.transactions, palette));

        SettlementView {
            balance_table_svg,
            transfer_table_svg,
        }
    }

    /// Both tables stacked into one SVG document, ready to save or rasterize.
    pub fn render_document(result: &SettlementResult, theme: Theme) -> Option<String> {
        let view = Self::render(result, theme);
        combine_svgs_vertically(&view.tables(), Palette::for_theme(theme).background)
    }

    pub fn build_balance_table_svg(balances: &[PersonBalance], palette: Palette) -> String {
        SvgTableBuilder::new()
            .alignments(&[Alignment::Left, Alignment::Right])
            .headers(&[Cow::Borrowed("Member"), Cow::Borrowed("Balance")])
            .palette(palette)
            .rows(balances.iter().map(|person| {
                [
                    Cow::Borrowed(person.name.as_str()),
                    Cow::Owned(format_signed_amount(person.balance)),
                ]
            }))
            .build()
    }

    pub fn build_transfer_table_svg(
        transactions: &[SettlementTransaction],
        palette: Palette,
    ) -> String {
        SvgTableBuilder::new()
            .alignments(&[Alignment::Left, Alignment::Left, Alignment::Right])
            .headers(&[
                Cow::Borrowed("From"),
                Cow::Borrowed("To"),
                Cow::Borrowed("Amount"),
            ])
            .palette(palette)
            .rows(transactions.iter().map(|transaction| {
                [
                    Cow::Borrowed(transaction.from.as_str()),
                    Cow::Borrowed(transaction.to.as_str()),
                    Cow::Owned(format_amount(transaction.amount)),
                ]
            }))
            .build()
    }

    pub fn render_text(result: &SettlementResult) -> String {
        let mut out = String::new();
        Self::write_balances(&mut out, &result.balances);
        out.push('\n');
        Self::write_transactions(&mut out, &result.transactions);
        out
    }

    pub fn render_balances_text(balances: &[PersonBalance]) -> String {
        let mut out = String::new();
        Self::write_balances(&mut out, balances);
        out
    }

    pub fn render_transactions_text(transactions: &[SettlementTransaction]) -> String {
        let mut out = String::new();
        Self::write_transactions(&mut out, transactions);
        out
    }

    fn write_balances(out: &mut String, balances: &[PersonBalance]) {
        let _ = writeln!(out, "Balances:");
        for person in balances {
            let _ = writeln!(
                out,
                "  {}: {}",
                person.name,
                format_signed_amount(person.balance)
            );
        }
    }

    fn write_transactions(out: &mut String, transactions: &[SettlementTransaction]) {
        if transactions.is_empty() {
            let _ = writeln!(out, "{NO_DEBTS}");
            return;
        }
        let _ = writeln!(out, "Settlements:");
        for transaction in transactions {
            let _ = writeln!(
                out,
                "  {} pays {} {}",
                transaction.from,
                transaction.to,
                format_amount(transaction.amount)
            );
        }
    }
}

/// Amount rounded to cents with two decimals.
pub fn format_amount(amount: Money) -> String {
    format!("{:.2}", amount.round_cents())
}

/// Like [`format_amount`] with an explicit `+` on non-negative values. The
/// sign follows the rounded amount, so sub-cent debts print as `+0.00`.
pub fn format_signed_amount(amount: Money) -> String {
    let rounded = amount.round_cents();
    let sign = if rounded.is_negative() { "" } else { "+" };
    format!("{sign}{rounded:.2}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use tripsplit_domain::ParticipantId;

    #[fixture]
    fn scenario() -> SettlementResult {
        let balance = |id, name: &str, amount| PersonBalance {
            id: ParticipantId(id),
            name: name.to_owned(),
            balance: Money::from_i64(amount),
        };
        let pay = |from: &str| SettlementTransaction {
            from: from.to_owned(),
            to: "A".to_owned(),
            amount: Money::from_i64(100),
        };
        SettlementResult {
            balances: vec![balance(1, "A", 200), balance(2, "B", -100), balance(3, "C", -100)],
            transactions: vec![pay("B"), pay("C")],
        }
    }

    #[rstest]
    fn text_lists_balances_and_payments(scenario: SettlementResult) {
        let text = SettlementPresenter::render_text(&scenario);

        assert_eq!(
            text,
            "Balances:\n  A: +200.00\n  B: -100.00\n  C: -100.00\n\n\
             Settlements:\n  B pays A 100.00\n  C pays A 100.00\n"
        );
    }

    #[test]
    fn text_for_settled_trip() {
        let text = SettlementPresenter::render_transactions_text(&[]);

        assert_eq!(text, format!("{NO_DEBTS}\n"));
    }

    #[rstest]
    fn render_includes_names_and_amounts(scenario: SettlementResult) {
        let view = SettlementPresenter::render(&scenario, Theme::Light);

        assert!(view.balance_table_svg.contains("+200.00"));
        assert!(view.balance_table_svg.contains("-100.00"));
        let transfers = view.transfer_table_svg.as_deref().expect("transfer table");
        assert!(transfers.contains(">B<"));
        assert!(transfers.contains("100.00"));
    }

    #[rstest]
    fn settled_trip_has_no_transfer_table(mut scenario: SettlementResult) {
        scenario.transactions.clear();

        let view = SettlementPresenter::render(&scenario, Theme::Dark);

        assert!(view.transfer_table_svg.is_none());
        assert_eq!(view.tables().len(), 1);
    }

    #[rstest]
    #[case::light(Theme::Light, "#ffffff")]
    #[case::dark(Theme::Dark, "#111827")]
    fn document_uses_theme_background(
        scenario: SettlementResult,
        #[case] theme: Theme,
        #[case] background: &str,
    ) {
        let document = SettlementPresenter::render_document(&scenario, theme).expect("document");

        assert!(document.contains(&format!(r#"fill="{background}""#)));
        assert!(document.contains("C"));
    }

    #[test]
    fn sub_cent_balances_round_half_away_from_zero() {
        let balance = |id, name: &str, amount| PersonBalance {
            id: ParticipantId(id),
            name: name.to_owned(),
            balance: amount,
        };
        let result = SettlementResult {
            balances: vec![
                balance(1, "A", Money::new(6667, 3)),
                balance(2, "B", Money::new(-6667, 3)),
                balance(3, "C", Money::new(-4, 3)),
            ],
            transactions: vec![SettlementTransaction {
                from: "B".to_owned(),
                to: "A".to_owned(),
                amount: Money::new(6667, 3),
            }],
        };

        let text = SettlementPresenter::render_text(&result);

        assert_eq!(
            text,
            "Balances:\n  A: +6.67\n  B: -6.67\n  C: +0.00\n\n\
             Settlements:\n  B pays A 6.67\n"
        );
        let view = SettlementPresenter::render(&result, Theme::Light);
        assert!(!view.balance_table_svg.contains("-0.00"));
        assert!(view.balance_table_svg.contains("-6.67"));
    }

    #[rstest]
    #[case::midpoint(Money::new(1005, 3), "1.01", "+1.01")]
    #[case::negative_midpoint(Money::new(-1005, 3), "-1.01", "-1.01")]
    #[case::negative_sub_cent(Money::new(-49, 4), "0.00", "+0.00")]
    #[case::whole(Money::from_i64(12), "12.00", "+12.00")]
    fn amounts_are_formatted_from_rounded_cents(
        #[case] amount: Money,
        #[case] plain: &str,
        #[case] signed: &str,
    ) {
        assert_eq!(format_amount(amount), plain);
        assert_eq!(format_signed_amount(amount), signed);
    }

    #[test]
    fn names_are_escaped() {
        let balances = [PersonBalance {
            id: ParticipantId(1),
            name: "Tom & Jerry".to_owned(),
            balance: Money::ZERO,
        }];

        let svg = SettlementPresenter::build_balance_table_svg(&balances, Palette::LIGHT);

        assert!(svg.contains("Tom &amp; Jerry"));
        assert!(svg.contains("+0.00"));
    }
}
