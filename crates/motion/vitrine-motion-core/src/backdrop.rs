//! Decorative particle backdrop.
//!
//! The simulation lives here; hosts draw a [`BackdropFrame`] with whichever
//! backend the page configured.

use std::fmt::Write as _;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::config::BackdropCfg;

/// Reference frame duration the per-frame velocities are expressed in.
const FRAME_MS: f64 = 1000.0 / 60.0;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackdropKind {
    #[default]
    Canvas2d,
    Svg,
    None,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    pub radius: f64,
    pub opacity: f64,
}

impl Particle {
    fn random(rng: &mut SmallRng, width: f64, height: f64, max_speed: f64) -> Self {
        Self {
            x: rng.gen::<f64>() * width,
            y: rng.gen::<f64>() * height,
            vx: (rng.gen::<f64>() - 0.5) * max_speed,
            vy: (rng.gen::<f64>() - 0.5) * max_speed,
            radius: rng.gen::<f64>() * 2.0 + 1.0,
            opacity: rng.gen::<f64>() * 0.8 + 0.2,
        }
    }

    fn step(&mut self, frames: f64, width: f64, height: f64) {
        self.x += self.vx * frames;
        self.y += self.vy * frames;
        if self.x < 0.0 || self.x > width {
            self.vx = -self.vx;
        }
        if self.y < 0.0 || self.y > height {
            self.vy = -self.vy;
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    pub alpha: f64,
}

/// Everything a renderer needs for one frame.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BackdropFrame {
    pub width: f64,
    pub height: f64,
    pub color: String,
    pub dots: Vec<Particle>,
    pub links: Vec<Link>,
}

impl BackdropFrame {
    /// Render as a standalone `<svg>` element.
    pub fn svg_markup(&self) -> String {
        let mut out = String::new();
        let _ = write!(
            out,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
            w = self.width,
            h = self.height
        );
        for l in &self.links {
            let _ = write!(
                out,
                r#"<line x1="{:.2}" y1="{:.2}" x2="{:.2}" y2="{:.2}" stroke="{}" stroke-opacity="{:.3}"/>"#,
                l.x1, l.y1, l.x2, l.y2, self.color, l.alpha
            );
        }
        for d in &self.dots {
            let _ = write!(
                out,
                r#"<circle cx="{:.2}" cy="{:.2}" r="{:.2}" fill="{}" fill-opacity="{:.3}"/>"#,
                d.x, d.y, d.radius, self.color, d.opacity
            );
        }
        out.push_str("</svg>");
        out
    }
}

#[derive(Debug)]
pub struct ParticleField {
    particles: Vec<Particle>,
    width: f64,
    height: f64,
    link_distance: f64,
    color: String,
}

impl ParticleField {
    pub fn new(cfg: &BackdropCfg, width: f64, height: f64) -> Self {
        let mut rng = SmallRng::seed_from_u64(cfg.seed);
        let particles = (0..cfg.particle_count)
            .map(|_| Particle::random(&mut rng, width, height, cfg.max_speed))
            .collect();
        Self {
            particles,
            width,
            height,
            link_distance: cfg.link_distance,
            color: cfg.color.clone(),
        }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    /// Particles keep their positions; ones left outside bounce back in.
    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width.max(0.0);
        self.height = height.max(0.0);
    }

    pub fn step(&mut self, dt_ms: f64) {
        let frames = dt_ms.max(0.0) / FRAME_MS;
        for p in &mut self.particles {
            p.step(frames, self.width, self.height);
        }
    }

    pub fn frame(&self) -> BackdropFrame {
        let mut links = Vec::new();
        for (i, a) in self.particles.iter().enumerate() {
            for b in &self.particles[i + 1..] {
                let d = ((b.x - a.x).powi(2) + (b.y - a.y).powi(2)).sqrt();
                if d < self.link_distance {
                    links.push(Link {
                        x1: a.x,
                        y1: a.y,
                        x2: b.x,
                        y2: b.y,
                        alpha: 0.2 * (1.0 - d / self.link_distance),
                    });
                }
            }
        }
        BackdropFrame {
            width: self.width,
            height: self.height,
            color: self.color.clone(),
            dots: self.particles.clone(),
            links,
        }
    }
}
