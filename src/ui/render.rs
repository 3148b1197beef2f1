use ratatui::Frame;

use servicefinder::model::Model;
use servicefinder::update::top_modal;

use super::{
    dialogs, header, layout,
    legend::{self, LegendContext},
    listing_list, search, sidebar, status_bar, toast,
};

/// Main render function - orchestrates all UI rendering
///
/// `tick` only drives the busy spinner.
pub fn render(f: &mut Frame, model: &Model, tick: usize) {
    let size = f.area();
    let ui = &model.ui;
    let dir = &model.directory;

    let search_visible = ui.search_mode || !dir.filters.search.is_empty();
    let legend_ctx = LegendContext {
        vim_mode: ui.vim_mode,
        search_mode: ui.search_mode,
        has_search_query: dir.filters.is_active(),
        signed_in: model.session.is_signed_in(),
        modal: top_modal(model),
    };
    let legend_height = legend::calculate_legend_height(size.width, legend_ctx);
    let layout_info = layout::calculate_layout(size, search_visible, legend_height);

    header::render_header(
        f,
        layout_info.header_area,
        &model.session.display_name(),
        model.session.is_signed_in(),
        dir.loading,
        dir.error.as_deref(),
    );

    if let Some(sidebar_area) = layout_info.sidebar_area {
        sidebar::render_sidebar(f, sidebar_area, dir);
    }

    listing_list::render_listings(
        f,
        layout_info.listings_area,
        dir,
        ui.view_mode,
        model.session.uid(),
    );

    if let Some(search_area) = layout_info.search_area {
        let query = if ui.search_mode {
            ui.search_input.as_str()
        } else {
            dir.filters.search.as_str()
        };
        search::render_search_input(
            f,
            search_area,
            query,
            ui.search_mode,
            dir.visible.len(),
            ui.search_debounce.is_pending(),
        );
    }

    legend::render_legend(f, layout_info.legend_area, legend_ctx);
    status_bar::render_status_bar(f, layout_info.status_area, model, tick);

    // Dialogs bottom-up so the one receiving keys is drawn last
    if let Some(auth) = &ui.auth {
        dialogs::render_auth_dialog(f, auth);
    }
    if let Some(profile) = &ui.profile {
        dialogs::render_profile_dialog(f, profile);
    }
    if let Some(add) = &ui.add_listing {
        dialogs::render_add_listing_dialog(f, add);
    }
    if let Some(listing) = &ui.contact {
        dialogs::render_contact_dialog(f, listing);
    }
    if let Some(rate) = &ui.rate {
        dialogs::render_rate_dialog(f, rate);
    }
    if let Some(confirm) = &ui.confirm_delete {
        dialogs::render_delete_confirmation(f, confirm);
    }

    if let Some((message, _)) = &ui.toast_message {
        toast::render_toast(f, size, message);
    }
}
