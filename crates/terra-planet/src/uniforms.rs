//! The typed uniform record and its GPU block.

use bytemuck::{Pod, Zeroable};

/// Render quality. Uploaded as its index and also picks the offscreen
/// render scale.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Quality {
    Low,
    #[default]
    Medium,
    High,
    Ultra,
}

impl Quality {
    pub const ALL: [Quality; 4] = [Quality::Low, Quality::Medium, Quality::High, Quality::Ultra];

    pub fn index(self) -> usize {
        match self {
            Quality::Low => 0,
            Quality::Medium => 1,
            Quality::High => 2,
            Quality::Ultra => 3,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn label(self) -> &'static str {
        match self {
            Quality::Low => "low",
            Quality::Medium => "medium",
            Quality::High => "high",
            Quality::Ultra => "ultra",
        }
    }

    /// Offscreen target size relative to the window.
    pub fn render_scale(self) -> f32 {
        match self {
            Quality::Low => 0.5,
            Quality::Medium => 0.75,
            Quality::High | Quality::Ultra => 1.0,
        }
    }
}

/// Every value the planet shader reads, under typed names.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanetUniforms {
    pub time:               f32,
    pub quality:            Quality,
    pub rotation_speed:     f32,
    pub resolution:         [f32; 2],
    pub planet_position:    [f32; 3],
    pub rotation_offset:    f32,
    pub planet_radius:      f32,
    pub noise_strength:     f32,
    pub terrain_scale:      f32,
    pub clouds_density:     f32,
    pub clouds_scale:       f32,
    pub clouds_speed:       f32,
    pub atmosphere_color:   [f32; 3],
    pub atmosphere_density: f32,
    pub ambient_light:      f32,
    pub sun_intensity:      f32,
    pub sun_direction_xy:   [f32; 2],
}

impl Default for PlanetUniforms {
    fn default() -> Self {
        Self::with_resolution(1280.0, 720.0)
    }
}

impl PlanetUniforms {
    pub fn with_resolution(width: f32, height: f32) -> Self {
        Self {
            time:               0.0,
            quality:            Quality::default(),
            rotation_speed:     1.0,
            resolution:         [width, height],
            planet_position:    [0.0, 0.0, 0.0],
            rotation_offset:    0.8,
            planet_radius:      2.0,
            noise_strength:     0.2,
            terrain_scale:      0.8,
            clouds_density:     0.5,
            clouds_scale:       1.0,
            clouds_speed:       1.0,
            atmosphere_color:   [0.05, 0.3, 0.9],
            atmosphere_density: 0.3,
            ambient_light:      0.002,
            sun_intensity:      3.0,
            sun_direction_xy:   [1.0, 1.0],
        }
    }

    pub fn value_of(&self, field: UniformField) -> UniformValue {
        use UniformValue::{Scalar, Vec2, Vec3};
        match field {
            UniformField::Time => Scalar(self.time),
            UniformField::Quality => Scalar(self.quality.index() as f32),
            UniformField::RotationSpeed => Scalar(self.rotation_speed),
            UniformField::Resolution => Vec2(self.resolution),
            UniformField::PlanetPosition => Vec3(self.planet_position),
            UniformField::RotationOffset => Scalar(self.rotation_offset),
            UniformField::PlanetRadius => Scalar(self.planet_radius),
            UniformField::NoiseStrength => Scalar(self.noise_strength),
            UniformField::TerrainScale => Scalar(self.terrain_scale),
            UniformField::CloudsDensity => Scalar(self.clouds_density),
            UniformField::CloudsScale => Scalar(self.clouds_scale),
            UniformField::CloudsSpeed => Scalar(self.clouds_speed),
            UniformField::AtmosphereColor => Vec3(self.atmosphere_color),
            UniformField::AtmosphereDensity => Scalar(self.atmosphere_density),
            UniformField::AmbientLight => Scalar(self.ambient_light),
            UniformField::SunIntensity => Scalar(self.sun_intensity),
            UniformField::SunDirectionXY => Vec2(self.sun_direction_xy),
        }
    }

    /// Fields whose values differ between `self` and `other`.
    pub fn diff(&self, other: &PlanetUniforms) -> Vec<UniformField> {
        UniformField::ALL
            .into_iter()
            .filter(|f| self.value_of(*f) != other.value_of(*f))
            .collect()
    }
}

/// Names of the shader inputs, one per record field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UniformField {
    Time,
    Quality,
    RotationSpeed,
    Resolution,
    PlanetPosition,
    RotationOffset,
    PlanetRadius,
    NoiseStrength,
    TerrainScale,
    CloudsDensity,
    CloudsScale,
    CloudsSpeed,
    AtmosphereColor,
    AtmosphereDensity,
    AmbientLight,
    SunIntensity,
    SunDirectionXY,
}

impl UniformField {
    pub const ALL: [UniformField; 17] = [
        UniformField::Time,
        UniformField::Quality,
        UniformField::RotationSpeed,
        UniformField::Resolution,
        UniformField::PlanetPosition,
        UniformField::RotationOffset,
        UniformField::PlanetRadius,
        UniformField::NoiseStrength,
        UniformField::TerrainScale,
        UniformField::CloudsDensity,
        UniformField::CloudsScale,
        UniformField::CloudsSpeed,
        UniformField::AtmosphereColor,
        UniformField::AtmosphereDensity,
        UniformField::AmbientLight,
        UniformField::SunIntensity,
        UniformField::SunDirectionXY,
    ];

    pub const fn shader_name(self) -> &'static str {
        match self {
            UniformField::Time => "uTime",
            UniformField::Quality => "uQuality",
            UniformField::RotationSpeed => "uRotationSpeed",
            UniformField::Resolution => "uResolution",
            UniformField::PlanetPosition => "uPlanetPosition",
            UniformField::RotationOffset => "uRotationOffset",
            UniformField::PlanetRadius => "uPlanetRadius",
            UniformField::NoiseStrength => "uNoiseStrength",
            UniformField::TerrainScale => "uTerrainScale",
            UniformField::CloudsDensity => "uCloudsDensity",
            UniformField::CloudsScale => "uCloudsScale",
            UniformField::CloudsSpeed => "uCloudsSpeed",
            UniformField::AtmosphereColor => "uAtmosphereColor",
            UniformField::AtmosphereDensity => "uAtmosphereDensity",
            UniformField::AmbientLight => "uAmbientLight",
            UniformField::SunIntensity => "uSunIntensity",
            UniformField::SunDirectionXY => "sunDirectionXY",
        }
    }

    pub fn from_shader_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.shader_name() == name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    Scalar(f32),
    Vec2([f32; 2]),
    Vec3([f32; 3]),
}

impl UniformValue {
    pub fn arity(self) -> usize {
        match self {
            UniformValue::Scalar(_) => 1,
            UniformValue::Vec2(_) => 2,
            UniformValue::Vec3(_) => 3,
        }
    }
}

/// `PlanetUniforms` as `planet.wgsl` declares it. vec3s sit on 16-byte
/// boundaries with a scalar packed into their fourth lane.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct PlanetUniformBlock {
    pub resolution:         [f32; 2],
    pub sun_direction_xy:   [f32; 2],
    pub planet_position:    [f32; 3],
    pub time:               f32,
    pub atmosphere_color:   [f32; 3],
    pub quality:            f32,
    pub rotation_speed:     f32,
    pub rotation_offset:    f32,
    pub planet_radius:      f32,
    pub noise_strength:     f32,
    pub terrain_scale:      f32,
    pub clouds_density:     f32,
    pub clouds_scale:       f32,
    pub clouds_speed:       f32,
    pub atmosphere_density: f32,
    pub ambient_light:      f32,
    pub sun_intensity:      f32,
    pub _pad:               f32,
}

impl PlanetUniformBlock {
    pub const SIZE: u64 = size_of::<PlanetUniformBlock>() as u64;
}

impl From<&PlanetUniforms> for PlanetUniformBlock {
    fn from(u: &PlanetUniforms) -> Self {
        Self {
            resolution:         u.resolution,
            sun_direction_xy:   u.sun_direction_xy,
            planet_position:    u.planet_position,
            time:               u.time,
            atmosphere_color:   u.atmosphere_color,
            quality:            u.quality.index() as f32,
            rotation_speed:     u.rotation_speed,
            rotation_offset:    u.rotation_offset,
            planet_radius:      u.planet_radius,
            noise_strength:     u.noise_strength,
            terrain_scale:      u.terrain_scale,
            clouds_density:     u.clouds_density,
            clouds_scale:       u.clouds_scale,
            clouds_speed:       u.clouds_speed,
            atmosphere_density: u.atmosphere_density,
            ambient_light:      u.ambient_light,
            sun_intensity:      u.sun_intensity,
            _pad:               0.0,
        }
    }
}

/// Pane accessors, keyed by shader name.
pub mod fields {
    use terra_ui::pane::Field;

    use super::{PlanetUniforms, Quality, UniformField};

    type F<T> = Field<PlanetUniforms, T>;

    pub const QUALITY: F<usize> = Field::new(
        UniformField::Quality.shader_name(),
        |u| u.quality.index(),
        |u, i| u.quality = Quality::from_index(i).unwrap_or(u.quality),
    );
    pub const ROTATION_SPEED: F<f32> =
        Field::new(UniformField::RotationSpeed.shader_name(), |u| u.rotation_speed, |u, v| u.rotation_speed = v);
    pub const ROTATION_OFFSET: F<f32> =
        Field::new(UniformField::RotationOffset.shader_name(), |u| u.rotation_offset, |u, v| u.rotation_offset = v);
    pub const PLANET_RADIUS: F<f32> =
        Field::new(UniformField::PlanetRadius.shader_name(), |u| u.planet_radius, |u, v| u.planet_radius = v);
    pub const NOISE_STRENGTH: F<f32> =
        Field::new(UniformField::NoiseStrength.shader_name(), |u| u.noise_strength, |u, v| u.noise_strength = v);
    pub const TERRAIN_SCALE: F<f32> =
        Field::new(UniformField::TerrainScale.shader_name(), |u| u.terrain_scale, |u, v| u.terrain_scale = v);
    pub const CLOUDS_DENSITY: F<f32> =
        Field::new(UniformField::CloudsDensity.shader_name(), |u| u.clouds_density, |u, v| u.clouds_density = v);
    pub const CLOUDS_SCALE: F<f32> =
        Field::new(UniformField::CloudsScale.shader_name(), |u| u.clouds_scale, |u, v| u.clouds_scale = v);
    pub const CLOUDS_SPEED: F<f32> =
        Field::new(UniformField::CloudsSpeed.shader_name(), |u| u.clouds_speed, |u, v| u.clouds_speed = v);
    pub const ATMOSPHERE_COLOR: F<[f32; 3]> =
        Field::new(UniformField::AtmosphereColor.shader_name(), |u| u.atmosphere_color, |u, v| u.atmosphere_color = v);
    pub const ATMOSPHERE_DENSITY: F<f32> = Field::new(
        UniformField::AtmosphereDensity.shader_name(),
        |u| u.atmosphere_density,
        |u, v| u.atmosphere_density = v,
    );
    pub const AMBIENT_LIGHT: F<f32> =
        Field::new(UniformField::AmbientLight.shader_name(), |u| u.ambient_light, |u, v| u.ambient_light = v);
    pub const SUN_INTENSITY: F<f32> =
        Field::new(UniformField::SunIntensity.shader_name(), |u| u.sun_intensity, |u, v| u.sun_intensity = v);
    pub const SUN_DIRECTION: F<[f32; 2]> =
        Field::new(UniformField::SunDirectionXY.shader_name(), |u| u.sun_direction_xy, |u, v| u.sun_direction_xy = v);
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::mem::offset_of;

    use super::*;

    // ── record ────────────────────────────────────────────────────────────

    #[test]
    fn defaults_match_reference_values() {
        let u = PlanetUniforms::default();
        assert_eq!(u.resolution, [1280.0, 720.0]);
        assert_eq!(u.quality, Quality::Medium);
        assert_eq!(u.rotation_offset, 0.8);
        assert_eq!(u.planet_radius, 2.0);
        assert_eq!(u.atmosphere_color, [0.05, 0.3, 0.9]);
        assert_eq!(u.ambient_light, 0.002);
        assert_eq!(u.sun_direction_xy, [1.0, 1.0]);
        assert_eq!(PlanetUniforms::with_resolution(10.0, 20.0).resolution, [10.0, 20.0]);
    }

    #[test]
    fn every_shader_name_is_listed_once_with_its_arity() {
        let names: HashSet<_> = UniformField::ALL.iter().map(|f| f.shader_name()).collect();
        assert_eq!(names.len(), UniformField::ALL.len());

        let u = PlanetUniforms::default();
        let arity = |name: &str| UniformField::from_shader_name(name).map(|f| u.value_of(f).arity());
        assert_eq!(arity("uResolution"), Some(2));
        assert_eq!(arity("uPlanetPosition"), Some(3));
        assert_eq!(arity("uAtmosphereColor"), Some(3));
        assert_eq!(arity("sunDirectionXY"), Some(2));
        assert_eq!(arity("uQuality"), Some(1));
        assert_eq!(arity("uMissing"), None);
    }

    #[test]
    fn diff_names_changed_fields() {
        let a = PlanetUniforms::default();
        let mut b = a.clone();
        b.clouds_speed = 4.0;
        b.sun_direction_xy[1] = -1.0;
        assert_eq!(a.diff(&b), vec![UniformField::CloudsSpeed, UniformField::SunDirectionXY]);
        assert!(a.diff(&a).is_empty());
    }

    #[test]
    fn quality_index_and_scale() {
        for (i, q) in Quality::ALL.into_iter().enumerate() {
            assert_eq!(q.index(), i);
            assert_eq!(Quality::from_index(i), Some(q));
        }
        assert_eq!(Quality::from_index(4), None);
        assert_eq!(Quality::Low.render_scale(), 0.5);
        assert_eq!(Quality::Medium.render_scale(), 0.75);
        assert_eq!(Quality::Ultra.render_scale(), 1.0);
    }

    #[test]
    fn quality_field_ignores_unknown_index() {
        let mut u = PlanetUniforms::default();
        (fields::QUALITY.set)(&mut u, 9);
        assert_eq!(u.quality, Quality::Medium);
        (fields::QUALITY.set)(&mut u, 0);
        assert_eq!(u.quality, Quality::Low);
    }

    // ── GPU block ─────────────────────────────────────────────────────────

    #[test]
    fn block_matches_wgsl_layout() {
        assert_eq!(PlanetUniformBlock::SIZE, 96);
        assert_eq!(offset_of!(PlanetUniformBlock, sun_direction_xy), 8);
        assert_eq!(offset_of!(PlanetUniformBlock, planet_position), 16);
        assert_eq!(offset_of!(PlanetUniformBlock, time), 28);
        assert_eq!(offset_of!(PlanetUniformBlock, atmosphere_color), 32);
        assert_eq!(offset_of!(PlanetUniformBlock, quality), 44);
        assert_eq!(offset_of!(PlanetUniformBlock, rotation_speed), 48);
        assert_eq!(offset_of!(PlanetUniformBlock, sun_intensity), 88);
    }

    #[test]
    fn block_carries_every_value() {
        let mut u = PlanetUniforms::default();
        u.quality = Quality::Ultra;
        u.time = 12.5;
        let b = PlanetUniformBlock::from(&u);
        assert_eq!(b.quality, 3.0);
        assert_eq!(b.time, 12.5);
        assert_eq!(b.atmosphere_color, u.atmosphere_color);
        assert_eq!(b.sun_intensity, 3.0);
        assert_eq!(bytemuck::bytes_of(&b).len(), 96);
    }
}
