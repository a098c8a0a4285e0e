//! Source fixtures and helpers shared by the pipeline tests.

use crate::ExecConfig;
use std::path::Path;
use std::time::Duration;

/// Sums 1..=10 across OpenMP threads; always prints `Sum: 55`.
pub const ARRAY_SUM: &str = r#"
#include <stdio.h>
#include <omp.h>

int main() {
    int sum = 0;
    #pragma omp parallel for reduction(+:sum)
    for (int i = 1; i <= 10; i++) {
        sum += i;
    }
    printf("Sum: %d\n", sum);
    return 0;
}
"#;

/// Missing semicolon; gcc reports the error with a line number.
pub const SYNTAX_ERROR: &str = r#"#include <stdio.h>

int main() {
    int x = 1
    return 0;
}
"#;

/// Spins forever in every thread; only the execution timeout ends it.
pub const INFINITE_LOOP: &str = r#"
#include <omp.h>

int main() {
    volatile long spin = 0;
    #pragma omp parallel
    {
        while (1) {
            spin++;
        }
    }
    return 0;
}
"#;

/// Exits non-zero after writing to both streams.
pub const FAILING_PROGRAM: &str = r#"
#include <stdio.h>

int main() {
    printf("got this far\n");
    fprintf(stderr, "giving up\n");
    return 7;
}
"#;

/// Calls a deny-listed function; must never be compiled.
pub const FORBIDDEN_SYSTEM: &str = r#"
#include <stdlib.h>

int main() {
    system("cat /etc/passwd");
    return 0;
}
"#;

/// MPI hello world, one line per rank.
pub const MPI_HELLO: &str = r#"
#include <mpi.h>
#include <stdio.h>

int main(int argc, char **argv) {
    MPI_Init(&argc, &argv);
    int rank = 0;
    int size = 0;
    MPI_Comm_rank(MPI_COMM_WORLD, &rank);
    MPI_Comm_size(MPI_COMM_WORLD, &size);
    printf("Hello from rank %d of %d\n", rank, size);
    MPI_Finalize();
    return 0;
}
"#;

pub fn gcc_available() -> bool {
    which::which("gcc").is_ok()
}

pub fn mpi_available() -> bool {
    which::which("mpicc").is_ok() && which::which("mpirun").is_ok()
}

pub fn test_config(scratch: &Path) -> ExecConfig {
    ExecConfig {
        scratch_root: scratch.to_path_buf(),
        ..ExecConfig::default()
    }
}

/// Short execution timeout for the timeout tests.
pub fn short_timeout_config(scratch: &Path) -> ExecConfig {
    ExecConfig {
        exec_timeout: Duration::from_secs(2),
        ..test_config(scratch)
    }
}
