//! Property-based invariant tests.
//!
//! Verifies:
//! 1. Debounce: a burst with gaps shorter than `wait` runs once, with the last args
//! 2. Debounce: gaps of at least `wait` run every call
//! 3. Sidebar: markers on the document always mirror the controller state
//! 4. Sidebar: Escape and wide resizes never leave the sidebar open
//! 5. Toasts: every toast is gone `duration + fade` after creation, whatever
//!    the creation times
//! 6. Validation: after any submit, each empty required field has exactly one
//!    error sibling and each filled one has none

use core::time::Duration;

use classroom_ui_core::debounce::debounce;
use classroom_ui_core::dom::{Dom, ElementSpec, MemoryDom};
use classroom_ui_core::event::UiEvent;
use classroom_ui_core::page::Page;
use classroom_ui_core::sidebar::SidebarState;
use classroom_ui_core::toast::ToastKind;
use classroom_ui_core::validation::error_sibling;
use classroom_ui_core::UiConfig;
use proptest::prelude::*;

// ── Strategy helpers ──────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
enum SidebarInput {
    Menu,
    Close,
    Overlay,
    Link,
    Escape,
    OtherKey,
    Resize(u32),
}

fn arb_sidebar_input() -> impl Strategy<Value = SidebarInput> {
    prop_oneof![
        Just(SidebarInput::Menu),
        Just(SidebarInput::Close),
        Just(SidebarInput::Overlay),
        Just(SidebarInput::Link),
        Just(SidebarInput::Escape),
        Just(SidebarInput::OtherKey),
        (200u32..2_000).prop_map(SidebarInput::Resize),
    ]
}

fn sidebar_page() -> Page<MemoryDom> {
    let mut dom = MemoryDom::new();
    dom.mount_in_body(ElementSpec::new("button").id("mobileMenuBtn"));
    dom.mount_in_body(
        ElementSpec::new("aside")
            .id("mobileSidebar")
            .child(ElementSpec::new("button").id("sidebarClose"))
            .child(ElementSpec::new("a").id("link").class("sidebar-link")),
    );
    dom.mount_in_body(ElementSpec::new("div").id("sidebarOverlay"));
    let mut page = Page::new(dom, UiConfig::default());
    page.init();
    page
}

fn to_event(page: &Page<MemoryDom>, input: SidebarInput) -> UiEvent {
    let by_id = |id: &str| page.dom().element_by_id(id).expect("fixture element");
    match input {
        SidebarInput::Menu => UiEvent::Click {
            target: by_id("mobileMenuBtn"),
        },
        SidebarInput::Close => UiEvent::Click {
            target: by_id("sidebarClose"),
        },
        SidebarInput::Overlay => UiEvent::Click {
            target: by_id("sidebarOverlay"),
        },
        SidebarInput::Link => UiEvent::Click {
            target: by_id("link"),
        },
        SidebarInput::Escape => UiEvent::key("Escape"),
        SidebarInput::OtherKey => UiEvent::key("a"),
        SidebarInput::Resize(width) => UiEvent::Resize { width, height: 800 },
    }
}

proptest! {
    #[test]
    fn debounce_burst_runs_once(
        calls in 1usize..20,
        gap in 0u64..200,
        wait in 200u64..1_000,
    ) {
        let mut seen = Vec::new();
        {
            let mut d = debounce(|i: usize| seen.push(i), Duration::from_millis(wait));
            let mut now = 0;
            for i in 0..calls {
                d.call(Duration::from_millis(now), i);
                now += gap;
                d.poll(Duration::from_millis(now.saturating_sub(1)));
            }
            d.poll(Duration::from_millis(now + wait));
        }
        prop_assert_eq!(seen, vec![calls - 1]);
    }

    #[test]
    fn debounce_spaced_calls_all_run(calls in 1usize..10, wait in 1u64..500) {
        let mut seen = Vec::new();
        {
            let mut d = debounce(|i: usize| seen.push(i), Duration::from_millis(wait));
            for i in 0..calls {
                let t = i as u64 * wait;
                d.poll(Duration::from_millis(t));
                d.call(Duration::from_millis(t), i);
            }
            d.poll(Duration::from_millis(calls as u64 * wait));
        }
        prop_assert_eq!(seen, (0..calls).collect::<Vec<_>>());
    }

    #[test]
    fn sidebar_markers_mirror_state(inputs in prop::collection::vec(arb_sidebar_input(), 1..40)) {
        let mut page = sidebar_page();
        let sidebar = page.dom().element_by_id("mobileSidebar").expect("sidebar");
        let overlay = page.dom().element_by_id("sidebarOverlay").expect("overlay");
        for input in inputs {
            let event = to_event(&page, input);
            page.dispatch(&event);

            let state = page.sidebar_state().expect("controller enabled");
            let open = state == SidebarState::Open;
            prop_assert_eq!(page.dom().has_class(sidebar, "active"), open);
            prop_assert_eq!(page.dom().has_class(overlay, "active"), open);
            prop_assert_eq!(page.dom().has_class(page.dom().body(), "sidebar-open"), open);

            match input {
                SidebarInput::Menu => prop_assert!(open),
                SidebarInput::Close | SidebarInput::Overlay | SidebarInput::Link
                | SidebarInput::Escape => prop_assert!(!open),
                SidebarInput::Resize(w) if w > 768 => prop_assert!(!open),
                _ => {}
            }
        }
    }

    #[test]
    fn every_toast_is_removed_on_schedule(offsets in prop::collection::vec(0u64..3_000, 1..12)) {
        let mut dom = MemoryDom::new();
        dom.mount_in_body(ElementSpec::new("main"));
        let mut page = Page::new(dom, UiConfig::default());
        page.init();

        let mut sorted = offsets.clone();
        sorted.sort_unstable();
        sorted.dedup();
        let mut handles = Vec::new();
        for at in sorted {
            page.set_time(Duration::from_millis(at));
            let handle = page.notify("saved", ToastKind::Success).expect("toast created");
            handles.push((at, handle));
        }
        for &(at, handle) in &handles {
            page.set_time(Duration::from_millis(at + 5_299));
            prop_assert!(page.dom().is_connected(handle.node));
            page.set_time(Duration::from_millis(at + 5_300));
            prop_assert!(!page.dom().is_connected(handle.node));
        }
        prop_assert!(page.active_toasts().is_empty());
    }

    #[test]
    fn submit_leaves_one_error_per_empty_field(
        values in prop::collection::vec(
            prop_oneof![Just(""), Just("  "), Just("x"), Just(" y ")],
            1..8,
        ),
        submits in 1usize..4,
    ) {
        let cfg = UiConfig::default();
        let mut spec = ElementSpec::new("form").id("f");
        for (i, v) in values.iter().enumerate() {
            let field = ElementSpec::new("input").id(&format!("field-{i}"));
            spec = spec.child(field.required().value(v));
        }
        let mut dom = MemoryDom::new();
        let form = dom.mount_in_body(spec);
        let mut page = Page::new(dom, cfg.clone());
        page.init();

        let mut prevented = false;
        for _ in 0..submits {
            prevented = page.dispatch(&UiEvent::Submit { target: form }).default_prevented;
        }

        let empties = values.iter().filter(|v| v.trim().is_empty()).count();
        prop_assert_eq!(prevented, empties > 0);
        prop_assert_eq!(page.dom().elements_by_class("error-message").len(), empties);
        for (i, v) in values.iter().enumerate() {
            let field = page.dom().element_by_id(&format!("field-{i}")).expect("field");
            let has_error = error_sibling(page.dom(), &cfg, field).is_some();
            prop_assert_eq!(has_error, v.trim().is_empty());
        }
    }
}
