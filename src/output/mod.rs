pub mod formatter;

pub use formatter::{
    format_ago, format_allocation_list, format_allocation_result, format_allocation_scenario,
    format_currency, format_number, format_progress_table, format_progress_tsv,
    format_projection_list, format_projection_result, format_projection_scenario, format_score,
    should_use_colors,
};
