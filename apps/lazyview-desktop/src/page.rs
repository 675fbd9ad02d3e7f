use lazyview_common::Rect;
use lazyview_view::{
    DeferredMount, DeferredSection, Element, LazyView, Node, Render, Resource, Suspense, ViewFn,
    deferred, view_fn,
};
use lazyview_visibility::ViewportObserver;

type StatsView = ViewFn<(), fn(&()) -> Render>;

/// Simulated module fetch time for the lazily loaded footer.
const STATS_LOAD_SECS: f32 = 0.75;

fn stats_view(_: &()) -> Render {
    Render::Ready(
        Element::new("div")
            .child(Element::new("h2").child("Loaded on demand"))
            .child(Element::new("p").child(
                "This panel's code was fetched only after it scrolled into range.",
            ))
            .into(),
    )
}

fn section_body(index: usize) -> Node {
    Element::new("section")
        .child(Element::new("h2").child(format!("Section {}", index + 1)))
        .child(Element::new("p").child(
            "Built up front, but kept out of the tree until it nears the viewport.",
        ))
        .into()
}

/// Scrolling page: a run of deferred sections with a lazily loaded footer.
///
/// Layout rects are reported to the observer while drawing; `flush` and
/// `update` run after the pass, so reveals land on the next frame.
pub struct Page {
    observer: ViewportObserver,
    sections: Vec<DeferredSection>,
    stats: DeferredMount<LazyView<StatsView>>,
    stats_module: Resource<StatsView>,
    stats_requested_at: Option<f32>,
    suspense: Suspense,
}

impl Page {
    pub fn new(section_count: usize) -> Self {
        let observer = ViewportObserver::default();

        let mut sections: Vec<DeferredSection> =
            (0..section_count).map(|i| DeferredSection::new(section_body(i))).collect();
        for section in &mut sections {
            section.mount(&observer);
        }

        let stats_module = Resource::pending();
        let mut stats = deferred(LazyView::new(stats_module.clone()));
        stats.mount(&observer);

        Self {
            observer,
            sections,
            stats,
            stats_module,
            stats_requested_at: None,
            suspense: Suspense::new(),
        }
    }

    pub fn revealed(&self) -> usize {
        self.sections.iter().filter(|s| s.is_visible()).count()
    }

    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    pub fn observed(&self) -> usize {
        self.observer.observed_count()
    }

    pub fn show(&self, ui: &mut egui::Ui) {
        let Page {
            observer,
            sections,
            stats,
            suspense,
            ..
        } = self;

        egui::ScrollArea::vertical()
            .auto_shrink([false; 2])
            .show(ui, |ui| {
                let clip = ui.clip_rect();
                observer.set_root(to_rect(clip));

                ui.heading("lazyview");
                ui.label("Scroll down. Sections appear as they approach the viewport.");
                ui.add_space(clip.height());

                for section in sections {
                    let response = ui
                        .scope(|ui| {
                            if section.is_visible() {
                                show_node(ui, &section.render(suspense));
                            } else {
                                let h = section.options().min_height.resolve(clip.height());
                                ui.allocate_space(egui::vec2(ui.available_width(), h));
                            }
                        })
                        .response;
                    observer.set_target_rect(section.element(), to_rect(response.rect));
                    ui.add_space(48.0);
                }

                let response = ui.scope(|ui| show_node(ui, &stats.render(&(), suspense))).response;
                observer.set_target_rect(stats.element(), to_rect(response.rect));
                ui.add_space(clip.height() * 0.5);
            });
    }

    /// Apply this frame's visibility changes and advance the footer load.
    pub fn update(&mut self, elapsed: f32) {
        self.observer.flush();

        for (i, section) in self.sections.iter_mut().enumerate() {
            if section.update() {
                tracing::info!(section = i + 1, "section revealed");
            }
        }

        if self.stats.update() {
            tracing::info!("stats panel requested");
            self.stats_requested_at = Some(elapsed);
        }
        if let Some(requested) = self.stats_requested_at {
            if self.stats_module.is_pending() && elapsed - requested >= STATS_LOAD_SECS {
                self.stats_module.resolve(view_fn(stats_view as fn(&()) -> Render));
                tracing::info!("stats panel loaded");
            }
        }
    }
}

fn to_rect(r: egui::Rect) -> Rect {
    Rect::new(r.min.x, r.min.y, r.width(), r.height())
}

fn text_of(el: &Element) -> String {
    el.children.iter().map(Node::text_content).collect()
}

/// Draw a markup tree with egui widgets.
fn show_node(ui: &mut egui::Ui, node: &Node) {
    match node {
        Node::Empty | Node::Suspended => {}
        Node::Text(t) => {
            ui.label(t.as_str());
        }
        Node::Fragment(children) => children.iter().for_each(|c| show_node(ui, c)),
        Node::Element(el) => show_element(ui, el),
    }
}

fn show_element(ui: &mut egui::Ui, el: &Element) {
    if el.attr_value("role") == Some("alert") {
        ui.colored_label(egui::Color32::LIGHT_RED, text_of(el));
        return;
    }
    if el.attr_value("aria-busy") == Some("true") {
        ui.horizontal(|ui| {
            ui.spinner();
            ui.label("Loading");
        });
        ui.add_space(96.0);
        return;
    }

    match el.tag.as_str() {
        "h1" | "h2" | "h3" => {
            ui.heading(text_of(el));
        }
        "p" | "span" => {
            ui.label(text_of(el));
        }
        "section" | "article" => {
            ui.group(|ui| {
                ui.set_width(ui.available_width());
                el.children.iter().for_each(|c| show_node(ui, c));
            });
        }
        _ => el.children.iter().for_each(|c| show_node(ui, c)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn egui_rect_maps_to_layout_rect() {
        let r = to_rect(egui::Rect::from_min_size(
            egui::pos2(10.0, 20.0),
            egui::vec2(300.0, 40.0),
        ));
        assert_eq!(r, Rect::new(10.0, 20.0, 300.0, 40.0));
    }

    #[test]
    fn new_page_observes_every_component() {
        let page = Page::new(4);
        assert_eq!(page.section_count(), 4);
        assert_eq!(page.observed(), 5);
        assert_eq!(page.revealed(), 0);
    }

    #[test]
    fn footer_loads_after_reveal() {
        let mut page = Page::new(0);
        page.observer.set_root(Rect::new(0.0, 0.0, 800.0, 600.0));
        page.observer
            .set_target_rect(page.stats.element(), Rect::new(0.0, 100.0, 800.0, 100.0));

        page.update(1.0);
        assert!(page.stats.is_visible());
        assert!(page.stats_module.is_pending());

        page.update(1.0 + STATS_LOAD_SECS);
        assert!(!page.stats_module.is_pending());
        let html = lazyview_view::HtmlRenderer::new();
        let out = lazyview_view::MarkupRenderer::render(&html, &page.stats.render(&(), &page.suspense));
        assert!(out.contains("Loaded on demand"));
    }
}
