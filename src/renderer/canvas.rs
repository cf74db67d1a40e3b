//! Canvas 2D renderer
//!
//! Draws the session state as it is after the frame's step; holds no state
//! of its own besides the context.

use std::f64::consts::PI;

use glam::Vec2;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, Element, HtmlCanvasElement};

use super::shapes::{ball_star, label_anchor, label_color, rect_origin};
use crate::sim::{Hsb, Particle, PlinkoSession};

const BACKGROUND: &str = "hsl(0, 0%, 20%)";
const LABEL_FONT: &str = "bold 20px 'Open Sans', sans-serif";
const OVERLAY_FONT: &str = "bold 120px 'Open Sans', sans-serif";

pub struct CanvasRenderer {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl CanvasRenderer {
    /// Create the board canvas inside `container`
    pub fn mount(container: &Element, width: f32, height: f32) -> Result<Self, JsValue> {
        let document = container
            .owner_document()
            .ok_or_else(|| JsValue::from_str("container is detached"))?;
        let canvas: HtmlCanvasElement = document.create_element("canvas")?.dyn_into()?;
        container.append_child(&canvas)?;
        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
            .dyn_into()?;
        let renderer = Self { canvas, ctx };
        renderer.resize(width, height);
        Ok(renderer)
    }

    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }

    pub fn resize(&self, width: f32, height: f32) {
        self.canvas.set_width(width as u32);
        self.canvas.set_height(height as u32);
    }

    /// Draw one frame; `overlay` is the countdown label, if any
    pub fn draw(&self, session: &PlinkoSession, overlay: Option<&str>) {
        let layout = session.layout();
        let ctx = &self.ctx;

        ctx.set_fill_style_str(BACKGROUND);
        ctx.fill_rect(0.0, 0.0, layout.width as f64, layout.height as f64);

        self.draw_labels(session);

        for peg in &layout.pegs {
            ctx.set_fill_style_str(&peg.color.to_css());
            ctx.begin_path();
            ctx.arc(peg.pos.x as f64, peg.pos.y as f64, peg.radius as f64, 0.0, 2.0 * PI)
                .ok();
            ctx.fill();
        }

        if let Some(ball) = session.ball() {
            self.draw_ball(ball);
        }

        for boundary in &layout.boundaries {
            let origin = rect_origin(boundary.center, boundary.size);
            ctx.set_fill_style_str(&boundary.color.to_css());
            ctx.fill_rect(
                origin.x as f64,
                origin.y as f64,
                boundary.size.x as f64,
                boundary.size.y as f64,
            );
        }

        if let Some(text) = overlay {
            self.draw_overlay(text, layout.width, layout.height);
        }
    }

    /// Zone titles written vertically, reading downwards, ending at the bottom
    fn draw_labels(&self, session: &PlinkoSession) {
        let ctx = &self.ctx;
        let layout = session.layout();
        let zone_width = session.zone_width();
        let columns = session.zones().len();

        ctx.set_font(LABEL_FONT);
        ctx.set_text_align("right");
        ctx.set_text_baseline("middle");
        for (i, title) in session.zones().iter().enumerate() {
            let anchor = label_anchor(i, zone_width, layout.height);
            let color = label_color(i, columns).to_css();
            ctx.save();
            ctx.translate(anchor.x as f64, anchor.y as f64).ok();
            ctx.rotate(PI / 2.0).ok();
            ctx.set_fill_style_str(&color);
            ctx.fill_text(title, 0.0, 0.0).ok();
            ctx.restore();
        }
    }

    fn draw_ball(&self, ball: &Particle) {
        let ctx = &self.ctx;
        ctx.set_fill_style_str(&ball.color.to_css());
        ctx.begin_path();
        ctx.arc(ball.pos.x as f64, ball.pos.y as f64, ball.radius as f64, 0.0, 2.0 * PI)
            .ok();
        ctx.fill();

        self.fill_polygon(&ball_star(ball.pos, ball.radius * 0.8), Hsb::WHITE);
    }

    fn fill_polygon(&self, points: &[Vec2], color: Hsb) {
        let ctx = &self.ctx;
        let Some((first, rest)) = points.split_first() else {
            return;
        };
        ctx.set_fill_style_str(&color.to_css());
        ctx.begin_path();
        ctx.move_to(first.x as f64, first.y as f64);
        for p in rest {
            ctx.line_to(p.x as f64, p.y as f64);
        }
        ctx.close_path();
        ctx.fill();
    }

    fn draw_overlay(&self, text: &str, width: f32, height: f32) {
        let ctx = &self.ctx;
        // Centre of the first screenful, where the page is scrolled on load
        let y = (height as f64).min(900.0) / 2.0;
        ctx.set_font(OVERLAY_FONT);
        ctx.set_text_align("center");
        ctx.set_text_baseline("middle");
        ctx.set_fill_style_str("rgba(0, 0, 0, 0.5)");
        ctx.fill_text(text, width as f64 / 2.0 + 4.0, y + 4.0).ok();
        ctx.set_fill_style_str(&Hsb::WHITE.to_css());
        ctx.fill_text(text, width as f64 / 2.0, y).ok();
    }
}
