use std::path::Path;

use anyhow::Context;
use lazyview_common::{ElementId, Rect};
use lazyview_view::{
    DeferOptions, DeferredMount, DeferredSection, Element, HtmlRenderer, MarkupRenderer, Node,
    Render, SectionOptions, Suspense, ViewFn, view_fn,
};
use lazyview_visibility::{ViewportObserver, VisibilityObserver};
use serde::{Deserialize, Serialize};

/// Which deferred component a scroll scenario exercises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ComponentKind {
    #[default]
    Mount,
    Section,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct ViewportSize {
    pub width: f32,
    pub height: f32,
}

impl Default for ViewportSize {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 720.0,
        }
    }
}

/// A page with one deferred element below the fold, scrolled in fixed steps.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Scenario {
    pub component: ComponentKind,
    pub mount: DeferOptions,
    pub section: SectionOptions,
    pub viewport: ViewportSize,
    /// Page offset of the observed element.
    pub element_top: f32,
    pub element_height: f32,
    /// Pixels scrolled per step.
    pub step: f32,
    /// Steps after the initial layout.
    pub steps: usize,
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            component: ComponentKind::Mount,
            mount: DeferOptions::default(),
            section: SectionOptions::default(),
            viewport: ViewportSize::default(),
            element_top: 1000.0,
            element_height: 300.0,
            step: 50.0,
            steps: 30,
        }
    }
}

impl Scenario {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading scenario {}", path.display()))?;
        let scenario = serde_yaml::from_str(&text)
            .with_context(|| format!("parsing scenario {}", path.display()))?;
        Ok(scenario)
    }

    /// Scroll through the page, rendering after every step.
    pub fn run(&self) -> ScrollReport {
        let observer = ViewportObserver::new(Rect::new(
            0.0,
            0.0,
            self.viewport.width,
            self.viewport.height,
        ));
        let mut component = Demo::build(self);
        component.mount(&observer);
        observer.set_target_rect(
            component.element(),
            Rect::new(0.0, self.element_top, self.viewport.width, self.element_height),
        );

        let suspense = Suspense::new();
        let html = HtmlRenderer::new();
        let mut mounted_at = None;
        let mut steps = Vec::with_capacity(self.steps + 1);

        for step in 0..=self.steps {
            if step > 0 {
                observer.scroll_by(self.step);
            }
            observer.flush();
            if component.update() {
                tracing::info!(step, "content mounted");
                mounted_at = Some(step);
            }
            let node = component.render(&suspense);
            steps.push(StepReport {
                step,
                scroll_y: observer.root().y,
                visible: component.is_visible(),
                html: html.render(&node),
                node,
            });
        }

        ScrollReport {
            component: self.component,
            mounted_at,
            steps,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StepReport {
    pub step: usize,
    pub scroll_y: f32,
    pub visible: bool,
    pub html: String,
    pub node: Node,
}

#[derive(Debug, Serialize)]
pub struct ScrollReport {
    pub component: ComponentKind,
    /// First step at which the content replaced the placeholder.
    pub mounted_at: Option<usize>,
    pub steps: Vec<StepReport>,
}

type DemoView = ViewFn<(), fn(&()) -> Render>;

fn demo_view(_: &()) -> Render {
    Render::Ready(
        Element::new("article")
            .child(Element::new("h2").child("Below the fold"))
            .child(Element::new("p").child("Mounted on approach."))
            .into(),
    )
}

enum Demo {
    Mount(DeferredMount<DemoView>),
    Section(DeferredSection),
}

impl Demo {
    fn build(scenario: &Scenario) -> Self {
        match scenario.component {
            ComponentKind::Mount => Demo::Mount(DeferredMount::with_options(
                view_fn(demo_view as fn(&()) -> Render),
                scenario.mount,
            )),
            ComponentKind::Section => {
                let children = Element::new("section")
                    .child(Element::new("h2").child("Below the fold"))
                    .child(Element::new("p").child("Revealed on approach."));
                Demo::Section(DeferredSection::with_options(children, scenario.section))
            }
        }
    }

    fn element(&self) -> ElementId {
        match self {
            Demo::Mount(m) => m.element(),
            Demo::Section(s) => s.element(),
        }
    }

    fn mount(&mut self, observer: &dyn VisibilityObserver) {
        match self {
            Demo::Mount(m) => m.mount(observer),
            Demo::Section(s) => s.mount(observer),
        }
    }

    fn update(&mut self) -> bool {
        match self {
            Demo::Mount(m) => m.update(),
            Demo::Section(s) => s.update(),
        }
    }

    fn is_visible(&self) -> bool {
        match self {
            Demo::Mount(m) => m.is_visible(),
            Demo::Section(s) => s.is_visible(),
        }
    }

    fn render(&self, suspense: &Suspense) -> Node {
        match self {
            Demo::Mount(m) => m.render(&(), suspense),
            Demo::Section(s) => s.render(suspense),
        }
    }
}
