//! Character (persona) queries.

use parley_types::{NewPersona, Persona};
use rusqlite::{params, Connection, OptionalExtension, Row};

const SELECT_COLUMNS: &str = "SELECT id, name, prompt, profile_image_url FROM characters";

fn map_row_to_persona(row: &Row<'_>) -> rusqlite::Result<Persona> {
    Ok(Persona {
        id: row.get(0)?,
        name: row.get(1)?,
        prompt_description: row.get(2)?,
        profile_image_url: row.get(3)?,
    })
}

/// Inserts a character and returns its assigned id.
pub fn add_character(conn: &Connection, persona: &NewPersona) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO characters (name, prompt, profile_image_url) VALUES (?1, ?2, ?3)",
        params![
            persona.name,
            persona.prompt_description,
            persona.profile_image_url
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Fetches a character by id, or `None` if it does not exist.
pub fn get_character(conn: &Connection, id: i64) -> rusqlite::Result<Option<Persona>> {
    conn.query_row(
        &format!("{SELECT_COLUMNS} WHERE id = ?1"),
        [id],
        map_row_to_persona,
    )
    .optional()
}

/// Lists all characters ordered by id.
pub fn list_characters(conn: &Connection) -> rusqlite::Result<Vec<Persona>> {
    let mut stmt = conn.prepare(&format!("{SELECT_COLUMNS} ORDER BY id ASC"))?;
    let rows = stmt.query_map([], map_row_to_persona)?;
    let mut characters = Vec::new();
    for row in rows {
        characters.push(row?);
    }
    Ok(characters)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::run_migrations;

    fn migrated() -> Connection {
        let conn = Connection::open_in_memory().expect("should open in-memory db");
        run_migrations(&conn).expect("migrations should succeed");
        conn
    }

    fn persona(name: &str, prompt: &str) -> NewPersona {
        NewPersona {
            name: name.to_string(),
            prompt_description: prompt.to_string(),
            profile_image_url: String::new(),
        }
    }

    #[test]
    fn add_then_get_round_trips_fields() {
        let conn = migrated();
        let input = NewPersona {
            name: "Captain Nemo".to_string(),
            prompt_description: "A reclusive submarine captain.".to_string(),
            profile_image_url: "https://example.com/nemo.png".to_string(),
        };

        let id = add_character(&conn, &input).unwrap();
        let stored = get_character(&conn, id).unwrap().expect("character should exist");

        assert_eq!(stored.id, id);
        assert_eq!(stored.name, input.name);
        assert_eq!(stored.prompt_description, input.prompt_description);
        assert_eq!(stored.profile_image_url, input.profile_image_url);
    }

    #[test]
    fn ids_are_assigned_sequentially() {
        let conn = migrated();
        let first = add_character(&conn, &persona("A", "a")).unwrap();
        let second = add_character(&conn, &persona("B", "b")).unwrap();
        assert!(second > first);
    }

    #[test]
    fn get_missing_returns_none() {
        let conn = migrated();
        assert_eq!(get_character(&conn, 7).unwrap(), None);
    }

    #[test]
    fn list_is_ordered_by_id() {
        let conn = migrated();
        add_character(&conn, &persona("Zed", "z")).unwrap();
        add_character(&conn, &persona("Amy", "a")).unwrap();

        let names: Vec<String> = list_characters(&conn)
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["Zed", "Amy"]);
    }
}
