use std::cell::{Cell, RefCell};
use std::rc::Rc;

use leptos::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    CanvasRenderingContext2d, CanvasWindingRule, HtmlCanvasElement, PointerEvent, WheelEvent,
};

use endonym_map_shared::render::{Frame, ShapeInstruction, ShapeStyle, TextInstruction};
use endonym_map_shared::{HitGrid, MapTransform, build_frame};

use crate::app::{Hovered, MapViewSignal, Regions};
use crate::colors::{
    BORDER, BORDER_HOVERED, LAND, LAND_HOVERED, LABEL_HALO, OCEAN, rgba_css_tuple,
};
use crate::render_loop::RenderScheduler;

const WHEEL_ZOOM_SENSITIVITY: f64 = 0.0015;
const LABEL_FONT_FAMILY: &str = "'JetBrains Mono', monospace";

struct ResizeBinding {
    window: web_sys::Window,
    _handler: wasm_bindgen::closure::Closure<dyn Fn()>,
}

thread_local! {
    static RESIZE_BINDING: RefCell<Option<ResizeBinding>> = const { RefCell::new(None) };
}

fn install_resize_listener(scheduler: RenderScheduler) {
    let Some(window) = web_sys::window() else {
        return;
    };
    RESIZE_BINDING.with(|slot| {
        if let Some(old) = slot.borrow_mut().take() {
            let _ = old.window.remove_event_listener_with_callback(
                "resize",
                old._handler.as_ref().unchecked_ref(),
            );
        }
    });

    let handler = wasm_bindgen::closure::Closure::<dyn Fn()>::new(move || scheduler.request());
    if window
        .add_event_listener_with_callback("resize", handler.as_ref().unchecked_ref())
        .is_ok()
    {
        RESIZE_BINDING.with(|slot| {
            *slot.borrow_mut() = Some(ResizeBinding {
                window: window.clone(),
                _handler: handler,
            });
        });
    }
}

fn device_pixel_ratio() -> f64 {
    web_sys::window()
        .map(|w| w.device_pixel_ratio())
        .unwrap_or(1.0)
        .max(1.0)
}

/// CSS size of the canvas container.
fn css_size(canvas: &HtmlCanvasElement) -> Option<(f64, f64)> {
    let parent = canvas.parent_element()?;
    let w = parent.client_width() as f64;
    let h = parent.client_height() as f64;
    (w > 0.0 && h > 0.0).then_some((w, h))
}

fn local_point(canvas: &HtmlCanvasElement, client_x: f64, client_y: f64) -> (f64, f64) {
    let rect = canvas.get_bounding_client_rect();
    (client_x - rect.left(), client_y - rect.top())
}

/// Canvas 2D map surface. Owns pointer, wheel and pinch input.
#[component]
pub fn MapCanvas() -> impl IntoView {
    let MapViewSignal(map_view) = expect_context();
    let Regions(regions) = expect_context();
    let Hovered(hovered) = expect_context();
    let mouse_pos: RwSignal<(f64, f64)> = expect_context();

    let canvas_ref = NodeRef::<leptos::html::Canvas>::new();

    let is_dragging = Rc::new(Cell::new(false));
    let last_x = Rc::new(Cell::new(0.0f64));
    let last_y = Rc::new(Cell::new(0.0f64));
    let pinch_dist = Rc::new(Cell::new(0.0f64));

    // Rebuilt whenever the region list changes
    let hit_grid: Rc<RefCell<HitGrid>> = Rc::new(RefCell::new(HitGrid::build(&[])));
    Effect::new({
        let grid = hit_grid.clone();
        move || {
            regions.with(|r| {
                *grid.borrow_mut() = HitGrid::build(r);
            });
        }
    });

    let cached_ctx: Rc<RefCell<Option<CanvasRenderingContext2d>>> = Rc::new(RefCell::new(None));

    let scheduler = RenderScheduler::new(move || {
        let Some(canvas) = canvas_ref.get_untracked() else {
            return;
        };
        let canvas: &HtmlCanvasElement = &canvas;
        let Some((w, h)) = css_size(canvas) else {
            return;
        };

        let dpr = device_pixel_ratio();
        let pw = (w * dpr).round().max(1.0) as u32;
        let ph = (h * dpr).round().max(1.0) as u32;
        if canvas.width() != pw || canvas.height() != ph {
            canvas.set_width(pw);
            canvas.set_height(ph);
            // Resizing resets context state
            *cached_ctx.borrow_mut() = None;
        }

        let ctx = {
            let mut cache = cached_ctx.borrow_mut();
            if cache.is_none() {
                let Some(ctx) = canvas
                    .get_context("2d")
                    .ok()
                    .flatten()
                    .and_then(|ctx| ctx.dyn_into::<CanvasRenderingContext2d>().ok())
                else {
                    return;
                };
                ctx.set_transform(dpr, 0.0, 0.0, dpr, 0.0, 0.0).ok();
                *cache = Some(ctx);
            }
            let Some(ctx) = cache.clone() else {
                return;
            };
            ctx
        };

        let map = map_view.get_untracked();
        let hov = hovered.get_untracked();
        let frame = regions.with_untracked(|r| build_frame(r, &map, w, h, hov));
        paint_frame(&ctx, w, h, &frame);
    });

    // Any view, data or hover change needs a repaint
    Effect::new({
        let scheduler = scheduler.clone();
        move || {
            map_view.track();
            regions.track();
            hovered.track();
            scheduler.request();
        }
    });

    // Viewport resizes do not touch any signal
    install_resize_listener(scheduler.clone());

    // --- Input handlers ---

    let on_wheel = move |e: WheelEvent| {
        e.prevent_default();
        let Some(canvas) = canvas_ref.get_untracked() else {
            return;
        };
        let Some((w, h)) = css_size(&canvas) else {
            return;
        };
        let (x, y) = local_point(&canvas, e.client_x() as f64, e.client_y() as f64);
        let factor = (-e.delta_y() * WHEEL_ZOOM_SENSITIVITY).exp();
        map_view.update(|m| m.zoom_at(w, h, factor, x, y));
    };

    let on_pointer_down = {
        let is_dragging = is_dragging.clone();
        let last_x = last_x.clone();
        let last_y = last_y.clone();
        move |e: PointerEvent| {
            is_dragging.set(true);
            hovered.set(None);
            last_x.set(e.client_x() as f64);
            last_y.set(e.client_y() as f64);

            if let Some(target) = e.target()
                && let Ok(el) = target.dyn_into::<web_sys::HtmlElement>()
            {
                el.set_pointer_capture(e.pointer_id()).ok();
                el.style().set_property("cursor", "grabbing").ok();
            }
        }
    };

    let on_pointer_move = {
        let is_dragging = is_dragging.clone();
        let last_x = last_x.clone();
        let last_y = last_y.clone();
        let grid = hit_grid.clone();
        move |e: PointerEvent| {
            let Some(canvas) = canvas_ref.get_untracked() else {
                return;
            };
            let Some((w, h)) = css_size(&canvas) else {
                return;
            };
            if is_dragging.get() {
                let dx = e.client_x() as f64 - last_x.get();
                let dy = e.client_y() as f64 - last_y.get();
                last_x.set(e.client_x() as f64);
                last_y.set(e.client_y() as f64);
                map_view.update(|m| m.pan(w, h, dx, dy));
                return;
            }

            let (sx, sy) = local_point(&canvas, e.client_x() as f64, e.client_y() as f64);
            let transform = MapTransform::new(&map_view.get_untracked(), w, h);
            let hit = transform.screen_to_geo(sx, sy).and_then(|(lon, lat)| {
                regions.with_untracked(|r| grid.borrow().find_at(r, lon, lat))
            });
            if hit != hovered.get_untracked() {
                hovered.set(hit);
            }
            if hit.is_some() {
                mouse_pos.set((e.client_x() as f64, e.client_y() as f64));
            }
        }
    };

    let on_pointer_up = {
        let is_dragging = is_dragging.clone();
        move |e: PointerEvent| {
            is_dragging.set(false);
            if let Some(target) = e.target()
                && let Ok(el) = target.dyn_into::<web_sys::HtmlElement>()
            {
                el.style().set_property("cursor", "grab").ok();
            }
        }
    };

    let on_pointer_leave = move |_: PointerEvent| {
        if hovered.get_untracked().is_some() {
            hovered.set(None);
        }
    };

    let on_touch_start = {
        let pinch_dist = pinch_dist.clone();
        move |e: web_sys::TouchEvent| {
            let touches = e.touches();
            if touches.length() == 2 {
                e.prevent_default();
                let (Some(t0), Some(t1)) = (touches.get(0), touches.get(1)) else {
                    return;
                };
                let dx = (t1.client_x() - t0.client_x()) as f64;
                let dy = (t1.client_y() - t0.client_y()) as f64;
                pinch_dist.set((dx * dx + dy * dy).sqrt());
            }
        }
    };

    let on_touch_move = {
        let pinch_dist = pinch_dist.clone();
        move |e: web_sys::TouchEvent| {
            let touches = e.touches();
            if touches.length() != 2 {
                return;
            }
            e.prevent_default();
            let (Some(t0), Some(t1)) = (touches.get(0), touches.get(1)) else {
                return;
            };
            let dx = (t1.client_x() - t0.client_x()) as f64;
            let dy = (t1.client_y() - t0.client_y()) as f64;
            let new_dist = (dx * dx + dy * dy).sqrt();
            let old_dist = pinch_dist.get();
            pinch_dist.set(new_dist);
            if old_dist <= 0.0 {
                return;
            }

            let Some(canvas) = canvas_ref.get_untracked() else {
                return;
            };
            let Some((w, h)) = css_size(&canvas) else {
                return;
            };
            let mid_x = (t0.client_x() + t1.client_x()) as f64 / 2.0;
            let mid_y = (t0.client_y() + t1.client_y()) as f64 / 2.0;
            let (x, y) = local_point(&canvas, mid_x, mid_y);
            map_view.update(|m| m.zoom_at(w, h, new_dist / old_dist, x, y));
        }
    };

    view! {
        <div
            style="position: relative; width: 100%; height: 100%; overflow: hidden;"
            on:wheel=on_wheel
            on:pointerdown=on_pointer_down
            on:pointermove=on_pointer_move
            on:pointerup=on_pointer_up
            on:pointerleave=on_pointer_leave
            on:touchstart=on_touch_start
            on:touchmove=on_touch_move
        >
            <canvas
                node_ref=canvas_ref
                style="position: absolute; inset: 0; width: 100%; height: 100%; touch-action: none; cursor: grab;"
            />
        </div>
    }
}

fn paint_frame(ctx: &CanvasRenderingContext2d, w: f64, h: f64, frame: &Frame) {
    ctx.set_fill_style_str(OCEAN);
    ctx.fill_rect(0.0, 0.0, w, h);

    // Hovered outline last so neighbours do not paint over it
    for shape in frame
        .shapes
        .iter()
        .filter(|s| s.style == ShapeStyle::Normal)
        .chain(frame.shapes.iter().filter(|s| s.style == ShapeStyle::Hovered))
    {
        draw_shape(ctx, shape);
    }

    ctx.set_text_align("center");
    ctx.set_text_baseline("middle");
    ctx.set_line_join("round");
    for label in &frame.labels {
        draw_label(ctx, label);
    }
}

fn draw_shape(ctx: &CanvasRenderingContext2d, shape: &ShapeInstruction) {
    ctx.begin_path();
    for path in &shape.paths {
        let mut points = path.iter();
        let Some(&(x0, y0)) = points.next() else {
            continue;
        };
        ctx.move_to(x0, y0);
        for &(x, y) in points {
            ctx.line_to(x, y);
        }
        ctx.close_path();
    }

    let (fill, stroke, width) = match shape.style {
        ShapeStyle::Normal => (LAND, BORDER, 0.6),
        ShapeStyle::Hovered => (LAND_HOVERED, BORDER_HOVERED, 1.4),
    };
    ctx.set_fill_style_str(&rgba_css_tuple(fill, 1.0));
    ctx.fill_with_canvas_winding_rule(CanvasWindingRule::Evenodd);
    ctx.set_stroke_style_str(stroke);
    ctx.set_line_width(width);
    ctx.stroke();
}

fn draw_label(ctx: &CanvasRenderingContext2d, label: &TextInstruction) {
    ctx.set_font(&format!("{:.2}px {LABEL_FONT_FAMILY}", label.font_px));
    ctx.set_stroke_style_str(LABEL_HALO);
    ctx.set_line_width((label.font_px * 0.18).max(1.0));
    ctx.stroke_text(&label.text, label.x, label.y).ok();
    ctx.set_fill_style_str(&rgba_css_tuple(label.fill, 0.92));
    ctx.fill_text(&label.text, label.x, label.y).ok();
}
