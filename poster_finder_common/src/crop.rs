use serde::{Deserialize, Serialize};

/// The edge (or middle) of a region that a narrower crop is anchored to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CropSide {
    Left,
    Right,
    Center,
}

impl CropSide {
    /// Order in which anchor positions are tried when looking for the part of a
    /// large image that a thumbnail was cut from. Only the first hit counts.
    pub const TRIAL_ORDER: [CropSide; 3] = [CropSide::Right, CropSide::Left, CropSide::Center];

    /// Single-letter code used by crop rules and proxy query strings.
    pub fn code(self) -> char {
        match self {
            CropSide::Left => 'l',
            CropSide::Right => 'r',
            CropSide::Center => 'c',
        }
    }

    /// Accepts `l`, `r`, `c` or the full words, in any case.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_lowercase().as_str() {
            "l" | "left" => Some(CropSide::Left),
            "r" | "right" => Some(CropSide::Right),
            "c" | "center" | "centre" => Some(CropSide::Center),
            _ => None,
        }
    }
}

/// A rectangle inside an image of resolution `orig_res`, stored as the number of
/// pixels trimmed from each edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Crop {
    pub orig_res: (u32, u32),
    pub left: u32,
    pub right: u32,
    pub top: u32,
    pub bottom: u32,
}

impl Crop {
    pub fn from_topleft_and_dims(
        (orig_width, orig_height): (u32, u32),
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    ) -> Self {
        let left = x;
        let right = orig_width - width - x;
        let top = y;
        let bottom = orig_height - height - y;
        Self {
            orig_res: (orig_width, orig_height),
            left,
            right,
            top,
            bottom,
        }
    }

    /// The whole image. `None` for images with a zero dimension.
    pub fn full(orig_res: (u32, u32)) -> Option<Self> {
        if orig_res.0 == 0 || orig_res.1 == 0 {
            return None;
        }
        Some(Self {
            orig_res,
            left: 0,
            right: 0,
            top: 0,
            bottom: 0,
        })
    }

    #[must_use]
    pub fn as_view_args(&self) -> (u32, u32, u32, u32) {
        (self.left, self.top, self.width(), self.height())
    }

    pub fn width(&self) -> u32 {
        self.orig_res.0 - (self.left + self.right)
    }

    pub fn height(&self) -> u32 {
        self.orig_res.1 - (self.top + self.bottom)
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width(), self.height())
    }

    pub fn aspect_ratio(&self) -> f64 {
        f64::from(self.width()) / f64::from(self.height())
    }

    pub fn is_uncropped(&self) -> bool {
        (self.left == 0) && (self.right == 0) && (self.top == 0) && (self.bottom == 0)
    }

    /// A rectangle given relative to this crop's top-left corner, expressed in
    /// the coordinates of the original image. `None` if it does not fit or is empty.
    pub fn sub_region(&self, x: u32, y: u32, width: u32, height: u32) -> Option<Self> {
        if width == 0 || height == 0 {
            return None;
        }
        if x.checked_add(width)? > self.width() || y.checked_add(height)? > self.height() {
            return None;
        }

        let left = self.left + x;
        let top = self.top + y;
        Some(Self {
            orig_res: self.orig_res,
            left,
            right: self.orig_res.0 - (left + width),
            top,
            bottom: self.orig_res.1 - (top + height),
        })
    }

    /// The largest rectangle of the given aspect ratio (width / height) that fits in
    /// this crop. Excess width is trimmed so the result hugs `side`; excess height
    /// is always trimmed evenly from top and bottom.
    pub fn anchored_to_aspect(&self, aspect: f64, side: CropSide) -> Option<Self> {
        if !aspect.is_finite() || aspect <= 0.0 {
            return None;
        }

        let (width, height) = self.dimensions();
        if self.aspect_ratio() > aspect {
            let new_width = ((f64::from(height) * aspect).round() as u32).clamp(1, width);
            let spare = width - new_width;
            let x = match side {
                CropSide::Left => 0,
                CropSide::Right => spare,
                CropSide::Center => spare / 2,
            };
            self.sub_region(x, 0, new_width, height)
        } else {
            let new_height = ((f64::from(width) / aspect).round() as u32).clamp(1, height);
            let y = (height - new_height) / 2;
            self.sub_region(0, y, width, new_height)
        }
    }

    /// Trims `fraction` of the height (rounded down) from both the top and the bottom.
    pub fn without_letterbox(&self, fraction: f64) -> Option<Self> {
        let (width, height) = self.dimensions();
        let bar = (f64::from(height) * fraction) as u32;
        if bar * 2 >= height {
            return None;
        }
        self.sub_region(0, bar, width, height - 2 * bar)
    }

    /// The left or right half. `Center` gives a half-width window in the middle.
    pub fn half(&self, side: CropSide) -> Option<Self> {
        let (width, height) = self.dimensions();
        let half = width / 2;
        let x = match side {
            CropSide::Left => 0,
            CropSide::Right => width - half,
            CropSide::Center => (width - half) / 2,
        };
        self.sub_region(x, 0, half, height)
    }

    /// Keeps only the rightmost `strip_width` columns.
    pub fn rightmost(&self, strip_width: u32) -> Option<Self> {
        let (width, height) = self.dimensions();
        let x = width.checked_sub(strip_width)?;
        self.sub_region(x, 0, strip_width, height)
    }
}
