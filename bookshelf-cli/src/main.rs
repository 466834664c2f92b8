use std::fs;
use std::io;
use std::path::Path;
use std::process;

use anyhow::{Context, Result};
use bookshelf_client::{
    Author, AuthResponse, Book, BookInput, BookListQuery, BookshelfClient, BookshelfClientError,
    ProfileUpdate, Registration, User,
};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;

const TOKEN_FILE: &str = ".bookshelf_token";
const DEFAULT_HTTP_SERVER: &str = "http://127.0.0.1:8080";
const SERVER_ENV: &str = "BOOKSHELF_SERVER";

#[derive(Debug, Parser)]
#[command(name = "bookshelf-cli", version, about = "CLI клиент для bookshelf-server")]
struct Cli {
    /// Адрес сервера (по умолчанию $BOOKSHELF_SERVER или http://127.0.0.1:8080).
    #[arg(long, global = true)]
    server: Option<String>,

    /// Печатать ответы сервера как JSON.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Регистрация пользователя.
    Register {
        #[arg(long)]
        username: String,
        #[arg(long, default_value = "")]
        email: String,
        #[arg(long)]
        password: String,
        /// Повтор пароля; по умолчанию совпадает с --password.
        #[arg(long)]
        password2: Option<String>,
        #[arg(long, default_value = "")]
        first_name: String,
        #[arg(long, default_value = "")]
        last_name: String,
        #[arg(long, default_value = "")]
        bio: String,
    },
    /// Вход пользователя.
    Login {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
    },
    /// Выход: отзывает токен и удаляет .bookshelf_token.
    Logout,
    /// Профиль текущего пользователя (требует токен).
    Profile,
    /// Частичное обновление профиля (требует токен).
    UpdateProfile {
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
        #[arg(long)]
        bio: Option<String>,
        /// Ссылка на аватар; пустая строка удаляет его.
        #[arg(long)]
        profile_picture: Option<String>,
    },
    /// Подписка на пользователя (требует токен).
    Follow {
        #[arg(long)]
        id: i64,
    },
    /// Отписка от пользователя (требует токен).
    Unfollow {
        #[arg(long)]
        id: i64,
    },
    /// Операции с книгами.
    #[command(subcommand)]
    Book(BookCommand),
    /// Операции с авторами.
    #[command(subcommand)]
    Author(AuthorCommand),
}

#[derive(Debug, Subcommand)]
enum BookCommand {
    /// Список книг с поиском, фильтрами и сортировкой.
    List(BookListArgs),
    /// Получение книги по id.
    Get {
        #[arg(long)]
        id: i64,
    },
    /// Создание книги (требует токен).
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        author: String,
        #[arg(long)]
        year: Option<i32>,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long)]
        price: f64,
    },
    /// Обновление книги (требует токен).
    ///
    /// Не указанные поля берутся из текущей версии книги.
    Update {
        #[arg(long)]
        id: i64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        author: Option<String>,
        #[arg(long)]
        year: Option<i32>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        price: Option<f64>,
    },
    /// Удаление книги (требует токен).
    Delete {
        #[arg(long)]
        id: i64,
    },
}

#[derive(Debug, Args)]
struct BookListArgs {
    /// Слова для поиска по названию и автору.
    #[arg(long)]
    search: Option<String>,
    /// Поле сортировки: id, title, author, publication_year, price; `-` для убывания.
    #[arg(long, allow_hyphen_values = true)]
    ordering: Option<String>,
    #[arg(long)]
    title: Option<String>,
    #[arg(long)]
    author: Option<String>,
    #[arg(long)]
    year: Option<i32>,
    #[arg(long)]
    price: Option<f64>,
}

impl From<BookListArgs> for BookListQuery {
    fn from(args: BookListArgs) -> Self {
        Self {
            search: args.search,
            ordering: args.ordering,
            title: args.title,
            author: args.author,
            publication_year: args.year,
            price: args.price,
        }
    }
}

#[derive(Debug, Subcommand)]
enum AuthorCommand {
    /// Список авторов.
    List,
    /// Получение автора по id.
    Get {
        #[arg(long)]
        id: i64,
    },
    /// Создание автора (требует токен).
    Create {
        #[arg(long)]
        name: String,
    },
    /// Удаление автора без книг (требует токен).
    Delete {
        #[arg(long)]
        id: i64,
    },
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("Ошибка: {err}");
        process::exit(1);
    }
}

async fn run() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let server = resolve_server(cli.server, std::env::var(SERVER_ENV).ok());
    let mut client = BookshelfClient::new(server).map_err(map_client_error)?;

    if let Some(token) = load_token().context("не удалось прочитать .bookshelf_token")? {
        client.set_token(token);
    }

    let output = Output { json: cli.json };

    match cli.command {
        Command::Register {
            username,
            email,
            password,
            password2,
            first_name,
            last_name,
            bio,
        } => {
            let registration = Registration {
                username,
                email,
                password2: password2.unwrap_or_else(|| password.clone()),
                password,
                first_name,
                last_name,
                bio,
            };
            let auth = client
                .register(&registration)
                .await
                .map_err(map_client_error)?;
            persist_token(&client).context("не удалось сохранить токен")?;
            output.auth("Регистрация успешна", &auth)?;
        }
        Command::Login { username, password } => {
            let auth = client
                .login(&username, &password)
                .await
                .map_err(map_client_error)?;
            persist_token(&client).context("не удалось сохранить токен")?;
            output.auth("Вход выполнен", &auth)?;
        }
        Command::Logout => {
            client.logout().await.map_err(map_client_error)?;
            remove_token().context("не удалось удалить .bookshelf_token")?;
            println!("Выход выполнен");
        }
        Command::Profile => {
            let user = client.profile().await.map_err(map_client_error)?;
            output.user("Профиль", &user)?;
        }
        Command::UpdateProfile {
            email,
            first_name,
            last_name,
            bio,
            profile_picture,
        } => {
            let update = ProfileUpdate {
                email,
                first_name,
                last_name,
                bio,
                profile_picture,
            };
            let user = client
                .update_profile(&update)
                .await
                .map_err(map_client_error)?;
            output.user("Профиль обновлён", &user)?;
        }
        Command::Follow { id } => {
            let user = client.follow(id).await.map_err(map_client_error)?;
            output.user("Подписка оформлена", &user)?;
        }
        Command::Unfollow { id } => {
            let user = client.unfollow(id).await.map_err(map_client_error)?;
            output.user("Подписка отменена", &user)?;
        }
        Command::Book(command) => run_book(&client, &output, command).await?,
        Command::Author(command) => run_author(&client, &output, command).await?,
    }

    Ok(())
}

async fn run_book(client: &BookshelfClient, output: &Output, command: BookCommand) -> Result<()> {
    match command {
        BookCommand::List(args) => {
            let books = client
                .list_books(&args.into())
                .await
                .map_err(map_client_error)?;
            output.books(&books)?;
        }
        BookCommand::Get { id } => {
            let book = client.get_book(id).await.map_err(map_client_error)?;
            output.book("Книга", &book)?;
        }
        BookCommand::Create {
            title,
            author,
            year,
            description,
            price,
        } => {
            let input = BookInput {
                title,
                author,
                publication_year: year,
                description,
                price,
            };
            let book = client.create_book(&input).await.map_err(map_client_error)?;
            output.book("Книга создана", &book)?;
        }
        BookCommand::Update {
            id,
            title,
            author,
            year,
            description,
            price,
        } => {
            // PUT заменяет все поля, поэтому недостающие берём из текущей версии.
            let current = client.get_book(id).await.map_err(map_client_error)?;
            let input = BookInput {
                title: title.unwrap_or(current.title),
                author: author.unwrap_or(current.author),
                publication_year: year.or(current.publication_year),
                description: description.unwrap_or(current.description),
                price: price.unwrap_or(current.price),
            };
            let book = client
                .update_book(id, &input)
                .await
                .map_err(map_client_error)?;
            output.book("Книга обновлена", &book)?;
        }
        BookCommand::Delete { id } => {
            client.delete_book(id).await.map_err(map_client_error)?;
            println!("Книга удалена: id={id}");
        }
    }
    Ok(())
}

async fn run_author(
    client: &BookshelfClient,
    output: &Output,
    command: AuthorCommand,
) -> Result<()> {
    match command {
        AuthorCommand::List => {
            let authors = client.list_authors().await.map_err(map_client_error)?;
            output.authors(&authors)?;
        }
        AuthorCommand::Get { id } => {
            let author = client.get_author(id).await.map_err(map_client_error)?;
            output.author("Автор", &author)?;
        }
        AuthorCommand::Create { name } => {
            let author = client
                .create_author(&name)
                .await
                .map_err(map_client_error)?;
            output.author("Автор создан", &author)?;
        }
        AuthorCommand::Delete { id } => {
            client.delete_author(id).await.map_err(map_client_error)?;
            println!("Автор удалён: id={id}");
        }
    }
    Ok(())
}

fn resolve_server(flag: Option<String>, env: Option<String>) -> String {
    let raw = flag
        .or(env)
        .filter(|server| !server.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_HTTP_SERVER.to_string());
    normalize_server(raw.trim().to_string())
}

fn normalize_server(server: String) -> String {
    if server.starts_with("http://") || server.starts_with("https://") {
        return server;
    }

    format!("http://{server}")
}

fn parse_token_content(raw: &str) -> Option<String> {
    let token = raw.trim().to_string();
    if token.is_empty() {
        return None;
    }
    Some(token)
}

fn load_token() -> io::Result<Option<String>> {
    if !Path::new(TOKEN_FILE).exists() {
        return Ok(None);
    }

    let raw = fs::read_to_string(TOKEN_FILE)?;
    Ok(parse_token_content(&raw))
}

fn persist_token(client: &BookshelfClient) -> io::Result<()> {
    if let Some(token) = client.get_token() {
        fs::write(TOKEN_FILE, token)?;
    }
    Ok(())
}

fn remove_token() -> io::Result<()> {
    match fs::remove_file(TOKEN_FILE) {
        Err(err) if err.kind() != io::ErrorKind::NotFound => Err(err),
        _ => Ok(()),
    }
}

fn map_client_error(err: BookshelfClientError) -> anyhow::Error {
    let message = match err {
        BookshelfClientError::Unauthorized(message) => format!(
            "требуется авторизация ({message}): выполните `bookshelf-cli login ...` или `bookshelf-cli register ...`"
        ),
        BookshelfClientError::NotFound => "ресурс не найден".to_string(),
        BookshelfClientError::Conflict(message) => format!("конфликт: {message}"),
        BookshelfClientError::InvalidRequest(message) => format!("некорректный запрос: {message}"),
        BookshelfClientError::Server(message) => format!("ошибка сервера: {message}"),
        BookshelfClientError::Http(err) => format!("ошибка HTTP: {err}"),
    };
    anyhow::anyhow!(message)
}

struct Output {
    json: bool,
}

impl Output {
    /// В режиме `--json` печатает значение целиком и возвращает `true`.
    fn print_json<T: Serialize>(&self, value: &T) -> Result<bool> {
        if !self.json {
            return Ok(false);
        }
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(true)
    }

    fn auth(&self, title: &str, auth: &AuthResponse) -> Result<()> {
        if self.print_json(auth)? {
            return Ok(());
        }
        println!("{title}");
        println!("token: {}", auth.token);
        print_user_fields(&auth.user, "  ");
        Ok(())
    }

    fn user(&self, title: &str, user: &User) -> Result<()> {
        if self.print_json(user)? {
            return Ok(());
        }
        println!("{title}");
        print_user_fields(user, "");
        Ok(())
    }

    fn book(&self, title: &str, book: &Book) -> Result<()> {
        if self.print_json(book)? {
            return Ok(());
        }
        println!("{title}");
        println!("id: {}", book.id);
        println!("title: {}", book.title);
        println!("author: {} (id={})", book.author, book.author_id);
        println!("publication_year: {}", format_year(book.publication_year));
        println!("price: {:.2}", book.price);
        if !book.description.is_empty() {
            println!("description: {}", book.description);
        }
        println!("created_at: {}", book.created_at);
        println!("updated_at: {}", book.updated_at);
        Ok(())
    }

    fn books(&self, books: &[Book]) -> Result<()> {
        if self.print_json(&books)? {
            return Ok(());
        }
        println!("Книг: {}", books.len());
        for book in books {
            println!(
                "- [{}] {} / {} ({}, {:.2})",
                book.id,
                book.title,
                book.author,
                format_year(book.publication_year),
                book.price
            );
        }
        Ok(())
    }

    fn author(&self, title: &str, author: &Author) -> Result<()> {
        if self.print_json(author)? {
            return Ok(());
        }
        println!("{title}");
        println!("id: {}", author.id);
        println!("name: {}", author.name);
        println!("book_count: {}", author.book_count);
        Ok(())
    }

    fn authors(&self, authors: &[Author]) -> Result<()> {
        if self.print_json(&authors)? {
            return Ok(());
        }
        println!("Авторов: {}", authors.len());
        for author in authors {
            println!("- [{}] {} (книг: {})", author.id, author.name, author.book_count);
        }
        Ok(())
    }
}

fn print_user_fields(user: &User, indent: &str) {
    println!("{indent}id: {}", user.id);
    println!("{indent}username: {}", user.username);
    println!("{indent}email: {}", user.email);
    println!("{indent}name: {} {}", user.first_name, user.last_name);
    if !user.bio.is_empty() {
        println!("{indent}bio: {}", user.bio);
    }
    if let Some(picture) = &user.profile_picture {
        println!("{indent}profile_picture: {picture}");
    }
    println!("{indent}followers: {:?}", user.followers);
    println!("{indent}following: {:?}", user.following);
    println!("{indent}date_joined: {}", user.date_joined);
}

fn format_year(year: Option<i32>) -> String {
    year.map(|year| year.to_string())
        .unwrap_or_else(|| "-".to_string())
}
