//! Telea's fast marching inpainting.
//!
//! Masked pixels are filled in order of their distance from the mask
//! boundary. Each one becomes a weighted mean of the already known pixels
//! within `radius`, favoring neighbors that are close, lie along the
//! marching direction, and sit at a similar distance from the boundary.

use image::{GrayImage, RgbImage};
use std::cmp::Ordering;
use std::collections::BinaryHeap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Known,
    Band,
    Inside,
}

#[derive(Debug, Clone, Copy)]
struct Front {
    time: f32,
    idx: usize,
}

impl PartialEq for Front {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Front {}

impl PartialOrd for Front {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// Reversed so the max-heap pops the smallest arrival time first.
impl Ord for Front {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .time
            .total_cmp(&self.time)
            .then_with(|| other.idx.cmp(&self.idx))
    }
}

struct Field {
    width: usize,
    height: usize,
    state: Vec<State>,
    time: Vec<f32>,
}

fn neighbours(
    x: usize,
    y: usize,
    width: usize,
    height: usize,
) -> impl Iterator<Item = (usize, usize)> {
    [(0isize, -1isize), (-1, 0), (1, 0), (0, 1)]
        .into_iter()
        .filter_map(move |(dx, dy)| {
            let nx = x.checked_add_signed(dx)?;
            let ny = y.checked_add_signed(dy)?;
            (nx < width && ny < height).then_some((nx, ny))
        })
}

impl Field {
    fn idx(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }

    fn is_known(&self, x: isize, y: isize) -> bool {
        self.time_if(x, y, |state: State| state == State::Known).is_some()
    }

    /// Arrival time at `(x, y)` if it is inside the image and its state
    /// passes `accept`.
    fn time_if(&self, x: isize, y: isize, accept: impl Fn(State) -> bool) -> Option<f32> {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return None;
        }
        let idx = self.idx(x as usize, y as usize);
        accept(self.state[idx]).then_some(self.time[idx])
    }

    fn arrival_time(&self, x: usize, y: usize) -> f32 {
        let (x, y) = (x as isize, y as isize);
        [(-1, -1), (1, -1), (-1, 1), (1, 1)]
            .into_iter()
            .map(|(sx, sy)| self.solve((x + sx, y), (x, y + sy)))
            .fold(f32::MAX, f32::min)
    }

    fn solve(&self, a: (isize, isize), b: (isize, isize)) -> f32 {
        let known = |state: State| state == State::Known;
        match (self.time_if(a.0, a.1, known), self.time_if(b.0, b.1, known)) {
            (Some(t1), Some(t2)) => {
                let diff = t1 - t2;
                if diff * diff >= 2.0 {
                    return 1.0 + t1.min(t2);
                }
                let root = (2.0 - diff * diff).sqrt();
                let low = (t1 + t2 - root) * 0.5;
                if low >= t1 && low >= t2 {
                    low
                } else {
                    let high = low + root;
                    if high >= t1 && high >= t2 {
                        high
                    } else {
                        1.0 + t1.min(t2)
                    }
                }
            }
            (Some(t1), None) => 1.0 + t1,
            (None, Some(t2)) => 1.0 + t2,
            (None, None) => f32::MAX,
        }
    }

    fn gradient(&self, x: usize, y: usize) -> (f32, f32) {
        let (x, y) = (x as isize, y as isize);
        let center = self.time[self.idx(x as usize, y as usize)];
        let outside = |state: State| state != State::Inside;
        let axis = |prev: Option<f32>, next: Option<f32>| match (prev, next) {
            (Some(p), Some(n)) => (n - p) * 0.5,
            (None, Some(n)) => n - center,
            (Some(p), None) => center - p,
            (None, None) => 0.0,
        };
        let gx = axis(
            self.time_if(x - 1, y, outside),
            self.time_if(x + 1, y, outside),
        );
        let gy = axis(
            self.time_if(x, y - 1, outside),
            self.time_if(x, y + 1, outside),
        );
        (gx, gy)
    }
}

pub(crate) fn inpaint(image: &RgbImage, mask: &GrayImage, radius: u32) -> RgbImage {
    let (width, height) = image.dimensions();
    debug_assert_eq!(mask.dimensions(), (width, height));
    let mut field = Field {
        width: width as usize,
        height: height as usize,
        state: vec![State::Known; (width as usize) * (height as usize)],
        time: vec![0.0; (width as usize) * (height as usize)],
    };
    let masked: Vec<bool> = mask.as_raw().iter().map(|value| *value != 0).collect();
    for (idx, is_masked) in masked.iter().enumerate() {
        if *is_masked {
            field.state[idx] = State::Inside;
            field.time[idx] = f32::MAX;
        }
    }

    let mut heap = BinaryHeap::new();
    for y in 0..field.height {
        for x in 0..field.width {
            let idx = field.idx(x, y);
            if field.state[idx] != State::Known {
                continue;
            }
            let borders_mask = neighbours(x, y, field.width, field.height)
                .any(|(nx, ny)| field.state[field.idx(nx, ny)] == State::Inside);
            if borders_mask {
                field.state[idx] = State::Band;
                heap.push(Front { time: 0.0, idx });
            }
        }
    }

    let mut pixels: Vec<[f32; 3]> = image.pixels().map(|pixel| pixel.0.map(f32::from)).collect();
    let radius = radius.max(1) as isize;

    while let Some(Front { idx, .. }) = heap.pop() {
        if field.state[idx] == State::Known {
            continue;
        }
        let (x, y) = (idx % field.width, idx / field.width);
        if masked[idx] {
            if let Some(value) = fill_pixel(&field, &pixels, x, y, radius) {
                pixels[idx] = value;
            }
        }
        field.state[idx] = State::Known;

        for (nx, ny) in neighbours(x, y, field.width, field.height) {
            let nidx = field.idx(nx, ny);
            if field.state[nidx] == State::Known {
                continue;
            }
            let time = field.arrival_time(nx, ny);
            if time < field.time[nidx] {
                field.time[nidx] = time;
                field.state[nidx] = State::Band;
                heap.push(Front { time, idx: nidx });
            }
        }
    }

    let mut output = RgbImage::new(width, height);
    for (pixel, value) in output.pixels_mut().zip(pixels) {
        pixel.0 = value.map(|channel| channel.round().clamp(0.0, 255.0) as u8);
    }
    output
}

fn fill_pixel(
    field: &Field,
    pixels: &[[f32; 3]],
    x: usize,
    y: usize,
    radius: isize,
) -> Option<[f32; 3]> {
    let (grad_x, grad_y) = field.gradient(x, y);
    let center_time = field.time[field.idx(x, y)];
    let (cx, cy) = (x as isize, y as isize);

    let mut sum = [0.0f64; 3];
    let mut total = 0.0f64;
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            let len_sq = (dx * dx + dy * dy) as f32;
            if len_sq == 0.0 || len_sq > (radius * radius) as f32 {
                continue;
            }
            let (nx, ny) = (cx + dx, cy + dy);
            if !field.is_known(nx, ny) {
                continue;
            }
            let nidx = field.idx(nx as usize, ny as usize);
            // vector from the neighbour to the pixel being filled
            let (rx, ry) = (-dx as f32, -dy as f32);
            let mut direction = (rx * grad_x + ry * grad_y).abs();
            if direction <= 0.01 {
                direction = 1.0e-6;
            }
            let distance = 1.0 / (len_sq * len_sq.sqrt());
            let level = 1.0 / (1.0 + (field.time[nidx] - center_time).abs());
            let weight = f64::from((direction * distance * level).abs());
            for channel in 0..3 {
                sum[channel] += weight * f64::from(pixels[nidx][channel]);
            }
            total += weight;
        }
    }

    if total <= 0.0 {
        return None;
    }
    Some(sum.map(|value| (value / total) as f32))
}
