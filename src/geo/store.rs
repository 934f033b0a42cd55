use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use super::{City, Country, StoreError};

/// Persistent Country/City lookup tables.
///
/// Both operations are get-or-create: fetch the matching row, or insert it
/// if none exists, as one atomic step. Existing rows are never updated.
pub trait LocationStore {
    fn get_or_create_country(&self, code: &str, name: &str) -> Result<Country, StoreError>;
    fn get_or_create_city(&self, name: &str, country: &Country) -> Result<City, StoreError>;
}

#[derive(Debug, Default)]
struct Tables {
    next_id: u64,
    countries: HashMap<String, Country>,
    cities: HashMap<(String, u64), City>,
}

impl Tables {
    fn allocate_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

/// Process-local store, safe to share between request threads.
#[derive(Debug, Default)]
pub struct InMemoryLocationStore {
    tables: Mutex<Tables>,
}

impl InMemoryLocationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn countries(&self) -> Result<Vec<Country>, StoreError> {
        let tables = self.lock()?;
        let mut rows: Vec<Country> = tables.countries.values().cloned().collect();
        rows.sort_by_key(|c| c.id);
        Ok(rows)
    }

    pub fn cities(&self) -> Result<Vec<City>, StoreError> {
        let tables = self.lock()?;
        let mut rows: Vec<City> = tables.cities.values().cloned().collect();
        rows.sort_by_key(|c| c.id);
        Ok(rows)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>, StoreError> {
        self.tables.lock().map_err(|_| StoreError::Poisoned)
    }
}

impl LocationStore for InMemoryLocationStore {
    fn get_or_create_country(&self, code: &str, name: &str) -> Result<Country, StoreError> {
        let mut tables = self.lock()?;
        if let Some(existing) = tables.countries.get(code) {
            return Ok(existing.clone());
        }
        let country = Country {
            id: tables.allocate_id(),
            code: code.to_string(),
            name: name.to_string(),
        };
        tables.countries.insert(code.to_string(), country.clone());
        Ok(country)
    }

    fn get_or_create_city(&self, name: &str, country: &Country) -> Result<City, StoreError> {
        let mut tables = self.lock()?;
        let key = (name.to_string(), country.id);
        if let Some(existing) = tables.cities.get(&key) {
            return Ok(existing.clone());
        }
        let city = City {
            id: tables.allocate_id(),
            name: name.to_string(),
            country: country.clone(),
        };
        tables.cities.insert(key, city.clone());
        Ok(city)
    }
}
