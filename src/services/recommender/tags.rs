use crate::models::TmdbMovieDetail;

/// Crew jobs whose names are folded into the tag string
const IMPORTANT_JOBS: [&str; 4] = ["Director", "Writer", "Producer", "Screenplay"];

/// Number of leading cast members included
const CAST_LIMIT: usize = 6;

/// Builds the tag string for a provider movie, in the same layout as the dataset tags:
/// overview, genres, keywords, top cast, key crew.
pub fn build_tags(movie: &TmdbMovieDetail) -> String {
    let overview = movie.overview.as_deref().unwrap_or_default();

    let genres = join_names(movie.genres.iter().map(|g| g.name.as_str()));

    let keywords = join_names(
        movie
            .keywords
            .iter()
            .flat_map(|k| k.keywords.iter())
            .map(|k| k.name.as_str()),
    );

    let cast = join_names(
        movie
            .credits
            .iter()
            .flat_map(|c| c.cast.iter().take(CAST_LIMIT))
            .map(|c| c.name.as_str()),
    );

    let crew = join_names(
        movie
            .credits
            .iter()
            .flat_map(|c| c.crew.iter())
            .filter(|c| IMPORTANT_JOBS.contains(&c.job.as_str()))
            .map(|c| c.name.as_str()),
    );

    format!("{} {} {} {} {}", overview, genres, keywords, cast, crew)
}

fn join_names<'a>(names: impl Iterator<Item = &'a str>) -> String {
    names.collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        TmdbCastMember, TmdbCredits, TmdbCrewMember, TmdbGenre, TmdbKeyword, TmdbKeywords,
    };

    fn cast(name: &str) -> TmdbCastMember {
        TmdbCastMember {
            name: name.to_string(),
            character: None,
        }
    }

    fn crew(name: &str, job: &str) -> TmdbCrewMember {
        TmdbCrewMember {
            name: name.to_string(),
            job: job.to_string(),
        }
    }

    #[test]
    fn test_build_tags_full() {
        let movie = TmdbMovieDetail {
            id: 27205,
            title: "Inception".to_string(),
            overview: Some("Dream heist.".to_string()),
            genres: vec![
                TmdbGenre {
                    id: 28,
                    name: "Action".to_string(),
                },
                TmdbGenre {
                    id: 878,
                    name: "Science Fiction".to_string(),
                },
            ],
            keywords: Some(TmdbKeywords {
                keywords: vec![TmdbKeyword {
                    id: 1,
                    name: "dream".to_string(),
                }],
            }),
            credits: Some(TmdbCredits {
                cast: ["A", "B", "C", "D", "E", "F", "G"].iter().map(|n| cast(n)).collect(),
                crew: vec![
                    crew("Nolan", "Director"),
                    crew("Editor Person", "Editor"),
                    crew("Thomas", "Producer"),
                    crew("Scribe", "Screenplay"),
                ],
            }),
            ..Default::default()
        };

        assert_eq!(
            build_tags(&movie),
            "Dream heist. Action Science Fiction dream A B C D E F Nolan Thomas Scribe"
        );
    }

    #[test]
    fn test_build_tags_missing_parts() {
        let movie = TmdbMovieDetail {
            id: 1,
            overview: Some("Only overview".to_string()),
            ..Default::default()
        };
        assert_eq!(build_tags(&movie), "Only overview    ");
    }

    #[test]
    fn test_build_tags_empty_movie() {
        let movie = TmdbMovieDetail::default();
        assert_eq!(build_tags(&movie).trim(), "");
    }
}
