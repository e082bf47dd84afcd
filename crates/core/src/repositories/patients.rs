//! Patient store.
//!
//! [`PatientRepository`] is the CRUD contract the dashboard and the API depend on. The
//! repository, not the caller, allocates each patient's identity at creation time.
//!
//! [`InMemoryPatientRepository`] keeps records in insertion order behind an `RwLock` and finds
//! them by linear scan; ward sizes make anything cleverer pointless. Records do not survive a
//! restart.

use crate::patient::{NewPatient, Patient, PatientUpdate};
use crate::{PatientError, PatientId, PatientResult};
use chrono::Utc;
use std::sync::RwLock;

/// CRUD operations over patient records.
pub trait PatientRepository: Send + Sync {
    /// All patients, in creation order.
    fn list(&self) -> PatientResult<Vec<Patient>>;

    /// # Errors
    ///
    /// Returns [`PatientError::NotFound`] if no patient has this id.
    fn get_by_id(&self, id: &PatientId) -> PatientResult<Patient>;

    /// Validates `data`, assigns a fresh id and stores the record.
    fn create(&self, data: NewPatient) -> PatientResult<Patient>;

    /// Applies a partial update and returns the stored result.
    ///
    /// The stored record is unchanged if validation fails.
    fn update(&self, id: &PatientId, patch: PatientUpdate) -> PatientResult<Patient>;

    /// Removes and returns the record.
    fn remove(&self, id: &PatientId) -> PatientResult<Patient>;
}

#[derive(Debug, Default)]
pub struct InMemoryPatientRepository {
    patients: RwLock<Vec<Patient>>,
}

impl InMemoryPatientRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a repository pre-populated from `seed`, in order.
    ///
    /// # Errors
    ///
    /// Returns the first validation error encountered.
    pub fn with_patients(seed: Vec<NewPatient>) -> PatientResult<Self> {
        let repo = Self::new();
        for data in seed {
            repo.create(data)?;
        }
        Ok(repo)
    }
}

fn not_found(id: &PatientId) -> PatientError {
    PatientError::NotFound(id.to_string())
}

impl PatientRepository for InMemoryPatientRepository {
    fn list(&self) -> PatientResult<Vec<Patient>> {
        let patients = self.patients.read().map_err(|_| PatientError::StoreLock)?;
        Ok(patients.clone())
    }

    fn get_by_id(&self, id: &PatientId) -> PatientResult<Patient> {
        let patients = self.patients.read().map_err(|_| PatientError::StoreLock)?;
        patients
            .iter()
            .find(|p| p.id == *id)
            .cloned()
            .ok_or_else(|| not_found(id))
    }

    fn create(&self, data: NewPatient) -> PatientResult<Patient> {
        let patient = data.into_patient(PatientId::generate(), Utc::now())?;

        let mut patients = self.patients.write().map_err(|_| PatientError::StoreLock)?;
        patients.push(patient.clone());

        tracing::info!(patient_id = %patient.id, "patient created");
        Ok(patient)
    }

    fn update(&self, id: &PatientId, patch: PatientUpdate) -> PatientResult<Patient> {
        let mut patients = self.patients.write().map_err(|_| PatientError::StoreLock)?;
        let slot = patients
            .iter_mut()
            .find(|p| p.id == *id)
            .ok_or_else(|| not_found(id))?;

        let updated = patch.apply(slot, Utc::now())?;
        *slot = updated.clone();

        tracing::info!(patient_id = %id, "patient updated");
        Ok(updated)
    }

    fn remove(&self, id: &PatientId) -> PatientResult<Patient> {
        let mut patients = self.patients.write().map_err(|_| PatientError::StoreLock)?;
        let index = patients
            .iter()
            .position(|p| p.id == *id)
            .ok_or_else(|| not_found(id))?;

        let removed = patients.remove(index);
        tracing::info!(patient_id = %id, "patient removed");
        Ok(removed)
    }
}
