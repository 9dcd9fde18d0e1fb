//! Dashboard page rendering - HTMX page

use crate::{base_html, AppState};
use cashdesk_config::CashCategory;
use cashdesk_core::{CategoryStats, ResolutionMode};

/// One card with the three counters and the category buttons
pub fn render_category_card(category: &CashCategory, stats: &CategoryStats) -> String {
    let key = &category.key;
    let movements = if category.line_collection.is_some() {
        format!(
            r#"<button hx-post='/api/categories/{}/movements' hx-swap='none' class='px-3 py-1.5 text-sm border rounded-lg hover:bg-gray-50'>Movements</button>"#,
            key
        )
    } else {
        String::new()
    };

    format!(
        r#"<div class='bg-white rounded-xl shadow-sm p-6' id='card-{key}'>
            <h3 class='text-lg font-semibold mb-4 cursor-pointer' hx-post='/api/categories/{key}/select' hx-swap='none'>{title}</h3>
            <div class='grid grid-cols-2 gap-4 mb-4'>
                <div class='text-center p-4 bg-gray-50 rounded-lg'><p class='text-sm text-gray-600'>Total</p><p class='text-xl font-bold'>{total}</p></div>
                <div class='text-center p-4 bg-green-50 rounded-lg'><p class='text-sm text-green-600'>Open</p><p class='text-xl font-bold text-green-700'>{open}</p></div>
                <div class='text-center p-4 bg-gray-50 rounded-lg'><p class='text-sm text-gray-600'>Closed</p><p class='text-xl font-bold'>{closed}</p></div>
                <div class='text-center p-4 bg-yellow-50 rounded-lg'><p class='text-sm text-yellow-600'>Draft</p><p class='text-xl font-bold text-yellow-700' id='draft-{key}'>{draft}</p></div>
            </div>
            <div class='flex gap-2'>
                <button hx-post='/api/categories/{key}/create' hx-swap='none' class='px-3 py-1.5 text-sm bg-indigo-600 text-white rounded-lg hover:bg-indigo-700'>New</button>
                <button hx-post='/api/categories/{key}/open' hx-swap='none' class='px-3 py-1.5 text-sm border rounded-lg hover:bg-gray-50'>Open</button>
                {movements}
            </div>
        </div>"#,
        key = key,
        title = category.title,
        total = stats.total,
        open = stats.open,
        closed = stats.closed,
        draft = stats.draft,
        movements = movements,
    )
}

fn mode_label(mode: ResolutionMode) -> &'static str {
    match mode {
        ResolutionMode::Filtered => "Showing your cash registers",
        ResolutionMode::Unfiltered => "Showing all cash registers",
        ResolutionMode::Unavailable => "Statistics unavailable",
    }
}

/// Dashboard page
pub async fn page_dashboard(state: axum::extract::State<AppState>) -> axum::response::Html<String> {
    let current = state.dashboard.state().await;
    let default_stats = CategoryStats::default();

    let cards: Vec<String> = state
        .dashboard
        .categories()
        .iter()
        .map(|category| {
            let stats = current.snapshot.get(&category.key).unwrap_or(&default_stats);
            render_category_card(category, stats)
        })
        .collect();

    let refreshed = current
        .refreshed_at
        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "never".to_string());

    let content = format!(
        r#"<main class='max-w-6xl mx-auto p-6'>
        <div class='flex items-center justify-between mb-6'>
            <div>
                <h2 class='text-2xl font-bold'>Cash Registers</h2>
                <p class='text-sm text-gray-500'>{} &middot; updated {}</p>
            </div>
            <button hx-post='/api/stats/refresh' hx-swap='none' hx-on::after-request='window.location.reload()' class='px-4 py-2 bg-indigo-600 text-white rounded-lg hover:bg-indigo-700'>Refresh</button>
        </div>
        <div class='grid grid-cols-1 lg:grid-cols-3 gap-6'>{}</div>
    </main>"#,
        mode_label(current.snapshot.mode),
        refreshed,
        cards.join("")
    );

    axum::response::Html(base_html("Cash Registers", &content))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_shows_all_counters() {
        let category = CashCategory::conventional("petty_cash", "petty_cash", "petty.cash", "Petty Cash");
        let stats = CategoryStats::new(9, 2, 3).with_draft(4);

        let html = render_category_card(&category, &stats);

        assert!(html.contains("id='draft-petty_cash'>4<"));
        assert!(html.contains(">9</p>"));
        assert!(html.contains("/api/categories/petty_cash/movements"));
    }
}
