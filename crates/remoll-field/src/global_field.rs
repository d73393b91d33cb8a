//! Sum of several field maps, e.g. one per magnet.
//!
//! The aggregator is an ordinary owned value: build it, hand a reference
//! to whatever needs the field.

use crate::field_map::FieldMap;
use crate::FieldSource;
use remoll_types::config::FieldSetupConfig;
use remoll_types::error::{FieldMapError, FieldMapResult};
use tracing::{info, warn};

#[derive(Debug)]
struct MagnetEntry {
    map: FieldMap,
    /// Current the map was tabulated at.
    reference_current: Option<f64>,
}

/// Collection of loaded field maps evaluated as one field.
#[derive(Debug, Default)]
pub struct GlobalField {
    magnets: Vec<MagnetEntry>,
}

impl GlobalField {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every map listed in `config`. Fails on the first map that does
    /// not load.
    pub fn from_config(config: &FieldSetupConfig) -> FieldMapResult<Self> {
        config.validate()?;
        let mut global = GlobalField::new();
        for magnet in &config.maps {
            let map = FieldMap::from_config(magnet)?;
            global.add_magnet(map, magnet.reference_current)?;
        }
        info!(maps = global.len(), "global field assembled");
        Ok(global)
    }

    /// Add a loaded map.
    pub fn add_field(&mut self, map: FieldMap) -> FieldMapResult<()> {
        self.add_magnet(map, None)
    }

    /// Add a loaded map together with the current it was tabulated at.
    pub fn add_magnet(
        &mut self,
        map: FieldMap,
        reference_current: Option<f64>,
    ) -> FieldMapResult<()> {
        if !map.is_init() {
            return Err(FieldMapError::NotInitialized(format!(
                "{}: refusing to add a field map that failed to load",
                map.name()
            )));
        }
        if let Some(current) = reference_current {
            if !current.is_finite() || current == 0.0 {
                return Err(FieldMapError::ConfigError(format!(
                    "{}: reference current must be finite and non-zero, got {current}",
                    map.name()
                )));
            }
        }
        if self.field(map.name()).is_some() {
            warn!(map = map.name(), "field map name registered twice");
        }
        self.magnets.push(MagnetEntry {
            map,
            reference_current,
        });
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.magnets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.magnets.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.magnets.iter().map(|m| m.map.name())
    }

    pub fn field(&self, name: &str) -> Option<&FieldMap> {
        self.magnets
            .iter()
            .find(|m| m.map.name() == name)
            .map(|m| &m.map)
    }

    fn entries_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a MagnetEntry> {
        self.magnets.iter().filter(move |m| m.map.name() == name)
    }

    /// Set the field scale of every map called `name`.
    pub fn set_field_scale(&self, name: &str, scale: f64) -> FieldMapResult<()> {
        let mut found = false;
        for entry in self.entries_named(name) {
            entry.map.set_field_scale(scale);
            found = true;
        }
        if !found {
            return Err(FieldMapError::UnknownField(name.to_string()));
        }
        Ok(())
    }

    /// Scale the map called `name` to a magnet current:
    /// `scale = current / reference_current`.
    ///
    /// Every map with that name must carry a reference current; otherwise
    /// no scale is changed.
    pub fn set_magnet_current(&self, name: &str, current: f64) -> FieldMapResult<()> {
        let scales = self
            .entries_named(name)
            .map(|entry| match entry.reference_current {
                Some(reference) => Ok((&entry.map, current / reference)),
                None => Err(FieldMapError::ConfigError(format!(
                    "{name}: no reference current, cannot scale by magnet current"
                ))),
            })
            .collect::<FieldMapResult<Vec<_>>>()?;
        if scales.is_empty() {
            return Err(FieldMapError::UnknownField(name.to_string()));
        }
        for (map, scale) in scales {
            map.set_field_scale(scale);
        }
        info!(map = name, current, "magnet current set");
        Ok(())
    }

    /// Summed field at `point = [x, y, z, t]`, written into `field`.
    pub fn get_field_value(&self, point: &[f64; 4], field: &mut [f64; 3]) {
        *field = [0.0; 3];
        for entry in &self.magnets {
            let b = entry.map.field_at(point);
            field[0] += b[0];
            field[1] += b[1];
            field[2] += b[2];
        }
    }
}

impl FieldSource for GlobalField {
    fn field_value(&self, point: &[f64; 4]) -> [f64; 3] {
        let mut field = [0.0; 3];
        self.get_field_value(point, &mut field);
        field
    }
}
