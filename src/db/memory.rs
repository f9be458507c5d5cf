use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, error};

use crate::disciplina::models::DisciplinaModel;
use crate::estudante::models::EstudanteModel;
use crate::matricula::models::MatriculaModel;
use crate::ong::models::OngModel;
use crate::professor::models::ProfessorModel;
use crate::projeto::models::ProjetoModel;
use crate::shared::{AppError, Pagination};
use crate::task::models::TaskModel;
use crate::task_estudante::models::TaskEstudanteModel;
use crate::user::models::UserModel;

/// Rows keyed by primary key, with a serial id generator that never reuses ids
#[derive(Debug)]
pub struct Table<T> {
    rows: BTreeMap<i32, T>,
    last_id: i32,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            last_id: 0,
        }
    }
}

impl<T: Clone> Table<T> {
    pub fn next_id(&mut self) -> i32 {
        self.last_id += 1;
        self.last_id
    }

    pub fn insert(&mut self, id: i32, row: T) -> T {
        self.rows.insert(id, row.clone());
        row
    }

    pub fn get(&self, id: i32) -> Option<T> {
        self.rows.get(&id).cloned()
    }

    pub fn get_mut(&mut self, id: i32) -> Option<&mut T> {
        self.rows.get_mut(&id)
    }

    pub fn contains(&self, id: i32) -> bool {
        self.rows.contains_key(&id)
    }

    pub fn remove(&mut self, id: i32) -> Option<T> {
        self.rows.remove(&id)
    }

    pub fn page(&self, pagination: &Pagination) -> Vec<T> {
        pagination.apply(self.rows.values().cloned())
    }

    pub fn find(&self, predicate: impl Fn(&T) -> bool) -> Option<T> {
        self.rows.values().find(|row| predicate(row)).cloned()
    }

    pub fn filter(&self, predicate: impl Fn(&T) -> bool) -> Vec<T> {
        self.rows
            .values()
            .filter(|row| predicate(row))
            .cloned()
            .collect()
    }

    pub fn ids_where(&self, predicate: impl Fn(&T) -> bool) -> Vec<i32> {
        self.rows
            .iter()
            .filter(|(_, row)| predicate(row))
            .map(|(id, _)| *id)
            .collect()
    }

    pub fn any(&self, predicate: impl Fn(&T) -> bool) -> bool {
        self.rows.values().any(predicate)
    }

    pub fn retain(&mut self, predicate: impl Fn(&T) -> bool) -> usize {
        let before = self.rows.len();
        self.rows.retain(|_, row| predicate(row));
        before - self.rows.len()
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.rows.values_mut()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Every table of the schema. Delete methods apply the same ON DELETE rules
/// as the SQL migrations.
#[derive(Debug, Default)]
pub struct Tables {
    pub users: Table<UserModel>,
    pub professores: Table<ProfessorModel>,
    pub estudantes: Table<EstudanteModel>,
    pub ongs: Table<OngModel>,
    pub disciplinas: Table<DisciplinaModel>,
    pub projetos: Table<ProjetoModel>,
    pub tasks: Table<TaskModel>,
    pub matriculas: Table<MatriculaModel>,
    pub task_estudantes: Table<TaskEstudanteModel>,
}

impl Tables {
    /// Cascades to the user's professor and student profiles
    pub fn delete_user(&mut self, user_id: i32) -> bool {
        if self.users.remove(user_id).is_none() {
            return false;
        }
        for professor_id in self.professores.ids_where(|p| p.user_id == user_id) {
            self.delete_professor(professor_id);
        }
        for student_id in self.estudantes.ids_where(|e| e.user_id == user_id) {
            self.delete_estudante(student_id);
        }
        debug!(user_id, "User deleted with cascades");
        true
    }

    /// Disciplinas keep existing without a professor
    pub fn delete_professor(&mut self, professor_id: i32) -> bool {
        if self.professores.remove(professor_id).is_none() {
            return false;
        }
        for disciplina in self.disciplinas.values_mut() {
            if disciplina.professor_id == Some(professor_id) {
                disciplina.professor_id = None;
            }
        }
        true
    }

    /// Cascades to the student's enrollments and task assignments
    pub fn delete_estudante(&mut self, student_id: i32) -> bool {
        if self.estudantes.remove(student_id).is_none() {
            return false;
        }
        let matriculas = self.matriculas.retain(|m| m.student_id != student_id);
        let assignments = self.task_estudantes.retain(|t| t.student_id != student_id);
        debug!(
            student_id,
            matriculas_removed = matriculas,
            assignments_removed = assignments,
            "Estudante deleted with cascades"
        );
        true
    }

    pub fn delete_ong(&mut self, ngo_id: i32) -> bool {
        if self.ongs.remove(ngo_id).is_none() {
            return false;
        }
        for projeto in self.projetos.values_mut() {
            if projeto.ngo_id == Some(ngo_id) {
                projeto.ngo_id = None;
            }
        }
        true
    }

    pub fn delete_disciplina(&mut self, disciplina_id: i32) -> bool {
        if self.disciplinas.remove(disciplina_id).is_none() {
            return false;
        }
        for projeto in self.projetos.values_mut() {
            if projeto.disciplina_id == Some(disciplina_id) {
                projeto.disciplina_id = None;
            }
        }
        true
    }

    /// Cascades to the project's tasks (and their assignments) and enrollments
    pub fn delete_projeto(&mut self, projeto_id: i32) -> bool {
        if self.projetos.remove(projeto_id).is_none() {
            return false;
        }
        for task_id in self.tasks.ids_where(|t| t.projeto_id == projeto_id) {
            self.delete_task(task_id);
        }
        let matriculas = self.matriculas.retain(|m| m.projeto_id != projeto_id);
        debug!(
            projeto_id,
            matriculas_removed = matriculas,
            "Projeto deleted with cascades"
        );
        true
    }

    /// Cascades to the task's assignments
    pub fn delete_task(&mut self, task_id: i32) -> bool {
        if self.tasks.remove(task_id).is_none() {
            return false;
        }
        self.task_estudantes.retain(|t| t.task_id != task_id);
        true
    }
}

/// In-memory relational store shared by all in-memory repositories.
///
/// Every repository operation runs under one lock, which makes each create,
/// update or delete atomic the way a single-statement transaction is.
/// Data is lost when the process exits.
#[derive(Debug, Clone, Default)]
pub struct MemoryDatabase {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lock(&self) -> Result<MutexGuard<'_, Tables>, AppError> {
        self.tables.lock().map_err(|_| {
            error!("In-memory database lock poisoned");
            AppError::Internal
        })
    }
}
