//! Backdrop renderers.

use vitrine_motion_core::{BackdropFrame, BackdropKind};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, Element, HtmlCanvasElement};

pub enum BackdropRenderer {
    Canvas {
        canvas: HtmlCanvasElement,
        ctx: CanvasRenderingContext2d,
    },
    Svg {
        host: Element,
    },
    None,
}

impl BackdropRenderer {
    /// Pick the renderer for `kind`. A canvas backdrop on a non-canvas
    /// element, or without a 2d context, renders nothing.
    pub fn for_element(kind: BackdropKind, el: &Element) -> Self {
        match kind {
            BackdropKind::Canvas2d => {
                let Some(canvas) = el.dyn_ref::<HtmlCanvasElement>().cloned() else {
                    log::warn!("canvas backdrop target is not a <canvas>");
                    return Self::None;
                };
                let ctx = canvas
                    .get_context("2d")
                    .ok()
                    .flatten()
                    .and_then(|c| c.dyn_into::<CanvasRenderingContext2d>().ok());
                match ctx {
                    Some(ctx) => Self::Canvas { canvas, ctx },
                    None => {
                        log::warn!("2d context unavailable; backdrop disabled");
                        Self::None
                    }
                }
            }
            BackdropKind::Svg => Self::Svg { host: el.clone() },
            BackdropKind::None => Self::None,
        }
    }

    pub fn is_active(&self) -> bool {
        !matches!(self, Self::None)
    }

    pub fn draw(&self, frame: &BackdropFrame) -> Result<(), JsValue> {
        match self {
            Self::Canvas { canvas, ctx } => {
                let (w, h) = (frame.width as u32, frame.height as u32);
                if canvas.width() != w || canvas.height() != h {
                    canvas.set_width(w);
                    canvas.set_height(h);
                }
                ctx.clear_rect(0.0, 0.0, frame.width, frame.height);
                ctx.set_fill_style_str(&frame.color);
                ctx.set_stroke_style_str(&frame.color);
                for link in &frame.links {
                    ctx.set_global_alpha(link.alpha);
                    ctx.begin_path();
                    ctx.move_to(link.x1, link.y1);
                    ctx.line_to(link.x2, link.y2);
                    ctx.stroke();
                }
                for dot in &frame.dots {
                    ctx.set_global_alpha(dot.opacity);
                    ctx.begin_path();
                    ctx.arc(dot.x, dot.y, dot.radius, 0.0, std::f64::consts::TAU)?;
                    ctx.fill();
                }
                ctx.set_global_alpha(1.0);
                Ok(())
            }
            Self::Svg { host } => {
                host.set_inner_html(&frame.svg_markup());
                Ok(())
            }
            Self::None => Ok(()),
        }
    }

    pub fn clear(&self) {
        match self {
            Self::Canvas { canvas, ctx } => {
                ctx.clear_rect(0.0, 0.0, canvas.width() as f64, canvas.height() as f64)
            }
            Self::Svg { host } => host.set_inner_html(""),
            Self::None => {}
        }
    }
}
