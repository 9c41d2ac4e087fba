#![warn(clippy::uninlined_format_args)]

pub mod settlement_presenter;
pub mod svg_table;

pub use settlement_presenter::{
    SettlementPresenter, SettlementView, format_amount, format_signed_amount,
};
pub use svg_table::{Alignment, Palette, SvgTableBuilder, combine_svgs_vertically};
