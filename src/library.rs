use std::fmt;
use std::path::Path;

use log::info;
use rusqlite::{Connection, OpenFlags};

use crate::error::Result;

/// Which kind of library database a pair of files came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LibraryKind {
    /// Movie libraries, matched on TMDB id
    Movies,
    /// TV libraries, matched on TVDB id, season and episode
    Episodes,
}

impl fmt::Display for LibraryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LibraryKind::Movies => write!(f, "movies"),
            LibraryKind::Episodes => write!(f, "episodes"),
        }
    }
}

const MOVIE_PAIRS: &str = "
    SELECT DISTINCT a.Path, af.RelativePath, b.Path, bf.RelativePath
    FROM main.Movies a
    JOIN main.MovieMetadata am ON am.Id = a.MovieMetadataId
    JOIN main.MovieFiles af ON af.MovieId = a.Id
    JOIN other.MovieMetadata bm ON bm.TmdbId = am.TmdbId
    JOIN other.Movies b ON b.MovieMetadataId = bm.Id
    JOIN other.MovieFiles bf ON bf.MovieId = b.Id
    WHERE am.TmdbId > 0";

const EPISODE_PAIRS: &str = "
    SELECT DISTINCT sa.Path, fa.RelativePath, sb.Path, fb.RelativePath
    FROM main.Series sa
    JOIN main.Episodes ea ON ea.SeriesId = sa.Id
    JOIN main.EpisodeFiles fa ON fa.Id = ea.EpisodeFileId
    JOIN other.Series sb ON sb.TvdbId = sa.TvdbId
    JOIN other.Episodes eb ON eb.SeriesId = sb.Id
        AND eb.SeasonNumber = ea.SeasonNumber
        AND eb.EpisodeNumber = ea.EpisodeNumber
    JOIN other.EpisodeFiles fb ON fb.Id = eb.EpisodeFileId
    WHERE sa.TvdbId > 0";

fn join_library_path(root: &str, relative: &str) -> String {
    format!("{}/{}", root.trim_end_matches('/'), relative.trim_start_matches('/'))
}

/// Read-only SQLite URI for `path`; `%`, `?` and `#` would otherwise be read as URI syntax
fn read_only_uri(path: &Path) -> String {
    let mut uri = String::from("file:");
    for c in path.to_string_lossy().chars() {
        match c {
            '%' => uri.push_str("%25"),
            '?' => uri.push_str("%3f"),
            '#' => uri.push_str("%23"),
            _ => uri.push(c),
        }
    }
    uri.push_str("?mode=ro");
    uri
}

/// Raw `(path in db_a, path in db_b)` for every file both libraries hold.
///
/// Both databases are opened read-only and closed before this returns.
pub fn candidate_paths(kind: LibraryKind, db_a: &Path, db_b: &Path) -> Result<Vec<(String, String)>> {
    let conn = Connection::open_with_flags(
        read_only_uri(db_a),
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_URI | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )?;
    conn.execute("ATTACH DATABASE ?1 AS other", [read_only_uri(db_b)])?;

    let sql = match kind {
        LibraryKind::Movies => MOVIE_PAIRS,
        LibraryKind::Episodes => EPISODE_PAIRS,
    };

    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map([], |row| {
        let root_a: String = row.get(0)?;
        let rel_a: String = row.get(1)?;
        let root_b: String = row.get(2)?;
        let rel_b: String = row.get(3)?;
        Ok((join_library_path(&root_a, &rel_a), join_library_path(&root_b, &rel_b)))
    })?;
    let pairs = rows.collect::<rusqlite::Result<Vec<_>>>()?;

    info!(
        "{} {} pairs between {} and {}",
        pairs.len(),
        kind,
        db_a.display(),
        db_b.display()
    );
    Ok(pairs)
}
