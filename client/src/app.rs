use std::sync::Arc;

use gloo_storage::Storage;
use leptos::prelude::*;
use wasm_bindgen_futures::spawn_local;

use endonym_map_shared::view::{ROTATION_MAX, ROTATION_MIN};
use endonym_map_shared::{DisplayMode, MapView, Region, SeamRotation, ViewState, names};

use crate::atlas;
use crate::canvas::MapCanvas;

const SETTINGS_KEY: &str = "endonym_map_settings";

/// Newtype wrappers so each signal gets its own Leptos context slot.
#[derive(Clone, Copy)]
pub(crate) struct MapViewSignal(pub RwSignal<MapView>);
#[derive(Clone, Copy)]
pub(crate) struct Regions(pub RwSignal<Arc<Vec<Region>>>);
#[derive(Clone, Copy)]
pub(crate) struct Hovered(pub RwSignal<Option<usize>>);

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum LoadState {
    Loading,
    Ready,
    Failed(String),
}

#[derive(serde::Serialize, serde::Deserialize, Default)]
#[serde(default)]
struct Settings {
    mode: DisplayMode,
    rotation: SeamRotation,
}

/// Root application component. Provides the map signals via context.
#[component]
pub fn App() -> impl IntoView {
    let saved: Settings = gloo_storage::LocalStorage::get(SETTINGS_KEY).unwrap_or_default();
    let map_view: RwSignal<MapView> =
        RwSignal::new(MapView::new(saved.mode, saved.rotation.value()));
    let regions: RwSignal<Arc<Vec<Region>>> = RwSignal::new(Arc::new(Vec::new()));
    let hovered: RwSignal<Option<usize>> = RwSignal::new(None);
    let mouse_pos: RwSignal<(f64, f64)> = RwSignal::new((0.0, 0.0));
    let load_state: RwSignal<LoadState> = RwSignal::new(LoadState::Loading);

    provide_context(MapViewSignal(map_view));
    provide_context(Regions(regions));
    provide_context(Hovered(hovered));
    provide_context(mouse_pos);

    // Persist only the user choices, not pan/zoom
    let persisted = Memo::new(move |_| {
        let map = map_view.get();
        (map.mode, map.rotation())
    });
    Effect::new(move || {
        let (mode, rotation) = persisted.get();
        let settings = Settings {
            mode,
            rotation: SeamRotation::new(rotation),
        };
        let _ = gloo_storage::LocalStorage::set(SETTINGS_KEY, &settings);
    });

    // Load geometry once on mount
    Effect::new(move || {
        spawn_local(async move {
            match atlas::fetch_regions().await {
                Ok(list) => {
                    regions.set(Arc::new(list));
                    load_state.set(LoadState::Ready);
                }
                Err(e) => {
                    web_sys::console::warn_1(&format!("Region fetch failed: {e}").into());
                    load_state.set(LoadState::Failed(e));
                }
            }
        });
    });

    view! {
        <div style="width: 100%; height: 100%; position: relative; overflow: hidden; background: #0c0e17;">
            {move || match load_state.get() {
                LoadState::Ready => view! { <MapCanvas /> }.into_any(),
                LoadState::Loading => view! { <StatusMessage text="Loading map\u{2026}" /> }.into_any(),
                LoadState::Failed(e) => view! { <StatusMessage text={format!("Map data unavailable ({e})")} /> }.into_any(),
            }}
            <Controls />
        </div>
        <Tooltip />
    }
}

#[component]
fn StatusMessage(#[prop(into)] text: String) -> impl IntoView {
    view! {
        <div style="position: absolute; inset: 0; display: flex; align-items: center; justify-content: center; color: #9a9590; font-family: 'JetBrains Mono', monospace; font-size: 0.85rem;">
            {text}
        </div>
    }
}

const CONTROL_BUTTON_STYLE: &str = "min-width: 32px; height: 32px; padding: 0 10px; background: #13161f; border: 1px solid #282c3e; border-radius: 6px; cursor: pointer; color: #e2e0d8; font-family: 'JetBrains Mono', monospace; font-size: 0.8rem;";

/// Mode toggle, seam slider and zoom buttons.
#[component]
fn Controls() -> impl IntoView {
    let MapViewSignal(map_view) = expect_context();

    let mode = Memo::new(move |_| map_view.get().mode);
    let rotation = Memo::new(move |_| map_view.get().rotation());
    let zoom = Memo::new(move |_| map_view.get().view.zoom());

    view! {
        <div style="position: absolute; top: 16px; left: 16px; z-index: 10; display: flex; flex-direction: column; gap: 8px; padding: 10px 12px; background: rgba(19,22,31,0.92); border: 1px solid #282c3e; border-radius: 8px; color: #9a9590; font-family: 'JetBrains Mono', monospace; font-size: 0.72rem;">
            <button
                style=CONTROL_BUTTON_STYLE
                title="Switch between endonyms and exonyms"
                on:click=move |_| map_view.update(|m| m.toggle_mode())
            >
                {move || format!("Showing {}", mode.get().label())}
            </button>
            <label style="display: flex; flex-direction: column; gap: 4px;">
                <span>{move || format!("Seam {:+.0}\u{00B0}", rotation.get())}</span>
                <input
                    type="range"
                    min=ROTATION_MIN.to_string()
                    max=ROTATION_MAX.to_string()
                    step="1"
                    prop:value=move || rotation.get().to_string()
                    on:input=move |ev| {
                        if let Ok(value) = event_target_value(&ev).parse::<f64>() {
                            map_view.update(|m| m.set_rotation(value));
                        }
                    }
                />
            </label>
            <div style="display: flex; gap: 6px; align-items: center;">
                <button
                    style=CONTROL_BUTTON_STYLE
                    title="Zoom in"
                    on:click=move |_| map_view.update(|m| m.view.zoom_in())
                >
                    "+"
                </button>
                <button
                    style=CONTROL_BUTTON_STYLE
                    title="Zoom out"
                    on:click=move |_| map_view.update(|m| m.view.zoom_out())
                >
                    "\u{2212}"
                </button>
                <button
                    style=CONTROL_BUTTON_STYLE
                    title="Reset view"
                    on:click=move |_| map_view.update(|m| m.view = ViewState::home(m.rotation()))
                >
                    "\u{21BA}"
                </button>
                <span style="margin-left: auto; font-variant-numeric: tabular-nums;">
                    {move || format!("{:.1}\u{00D7}", zoom.get())}
                </span>
            </div>
        </div>
    }
}

/// Follows the cursor over a region, showing both of its names.
#[component]
fn Tooltip() -> impl IntoView {
    let Hovered(hovered) = expect_context();
    let Regions(regions) = expect_context();
    let MapViewSignal(map_view) = expect_context();
    let mouse_pos: RwSignal<(f64, f64)> = expect_context();

    let tooltip_info = Memo::new(move |_| {
        let idx = hovered.get()?;
        let mode = map_view.get().mode;
        regions.with(|r| {
            let canonical = r.get(idx)?.name().to_owned();
            let native = names::endonym(&canonical).filter(|n| *n != canonical);
            Some((canonical, native, mode))
        })
    });

    view! {
        {move || {
            let Some((canonical, native, mode)) = tooltip_info.get() else {
                return view! { <div style="display:none;" /> }.into_any();
            };
            let (x, y) = mouse_pos.get();
            let (primary, secondary) = match (mode, native) {
                (DisplayMode::Endonym, Some(native)) => (native.to_owned(), Some(canonical)),
                (DisplayMode::Exonym, Some(native)) => (canonical, Some(native.to_owned())),
                (_, None) => (canonical, None),
            };
            view! {
                <div
                    style:left=format!("{}px", x + 16.0)
                    style:top=format!("{}px", y - 8.0)
                    style="position: fixed; pointer-events: none; z-index: 100; background: #161921; border: 1px solid #282c3e; border-radius: 6px; box-shadow: 0 4px 16px rgba(0,0,0,0.5); max-width: 240px; padding: 6px 10px;"
                >
                    <div style="font-size: 0.82rem; font-weight: 700; color: #e2e0d8; font-family: 'JetBrains Mono', monospace; line-height: 1.3;">
                        {primary}
                    </div>
                    {secondary.map(|name| view! {
                        <div style="font-size: 0.72rem; color: #9a9590; font-family: 'JetBrains Mono', monospace; margin-top: 2px;">
                            {name}
                        </div>
                    })}
                </div>
            }.into_any()
        }}
    }
}
