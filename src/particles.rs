//! Decorative background particles. Knows nothing about the launcher.

pub const PARTICLE_COUNT: usize = 50;

#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub speed_x: f32,
    pub speed_y: f32,
    pub alpha: i32,
    /// Red, green and blue; alpha lives in `alpha`.
    pub rgb: [u8; 3],
}

pub struct ParticleField {
    particles: Vec<Particle>,
    rng: fastrand::Rng,
}

impl Default for ParticleField {
    fn default() -> Self {
        Self::new(fastrand::Rng::new())
    }
}

impl ParticleField {
    pub fn new(rng: fastrand::Rng) -> Self {
        Self {
            particles: Vec::with_capacity(PARTICLE_COUNT),
            rng,
        }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    fn spawn(&mut self, width: f32, height: f32) -> Particle {
        let rng = &mut self.rng;
        Particle {
            x: rng.f32() * width,
            y: rng.f32() * height,
            size: rng.u8(2..=5) as f32,
            speed_x: rng.f32() - 0.5,
            speed_y: rng.f32() - 0.5,
            alpha: rng.i32(100..=200),
            rgb: [rng.u8(100..=200), rng.u8(100..=200), rng.u8(200..=255)],
        }
    }

    /// One animation tick: move, fade, respawn what left or faded, top up.
    pub fn tick(&mut self, width: f32, height: f32) {
        for i in 0..self.particles.len() {
            let p = &mut self.particles[i];
            p.x += p.speed_x;
            p.y += p.speed_y;
            p.alpha -= 1;

            let inside = (0.0..=width).contains(&p.x) && (0.0..=height).contains(&p.y);
            if !inside || p.alpha <= 0 {
                let fresh = self.spawn(width, height);
                self.particles[i] = fresh;
            }
        }

        while self.particles.len() < PARTICLE_COUNT {
            let fresh = self.spawn(width, height);
            self.particles.push(fresh);
        }
    }
}
